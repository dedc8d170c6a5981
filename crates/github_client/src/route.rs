//! Route templates in the `"METHOD /path/{placeholder}"` form used by the GitHub REST docs.
//!
//! A route is expanded against a JSON parameter object: every `{placeholder}` in the path
//! is replaced by the parameter of the same name, the consumed parameters are removed and
//! whatever is left becomes the request body (or the query string for `GET`).

use http::Method;
use serde_json::{Map, Value};

use crate::Error;

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;

/// A parsed route template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    method: Method,
    template: String,
}

/// A route with all placeholders filled in, ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandedRoute {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Route {
    /// Parses `"PUT /repos/{owner}/{repo}/branches/{branch}/protection"` style routes.
    pub fn parse(route: &str) -> Result<Self, Error> {
        let (method, template) = route
            .trim()
            .split_once(' ')
            .ok_or_else(|| invalid(route, "expected '<METHOD> <path>'"))?;

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| invalid(route, "unknown HTTP method"))?;

        let template = template.trim();
        if !template.starts_with('/') {
            return Err(invalid(route, "path must start with '/'"));
        }

        Ok(Self {
            method,
            template: template.to_string(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fills the placeholders from `params` and splits off the remaining parameters.
    ///
    /// `params` must be a JSON object or `null`. String, number and boolean parameters can
    /// fill placeholders; placeholder values are percent-encoded as path segments.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoute` when a placeholder has no matching parameter, a
    /// placeholder is not closed, or `params` is neither an object nor `null`.
    pub fn expand(&self, params: &Value) -> Result<ExpandedRoute, Error> {
        let mut remaining: Map<String, Value> = match params {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => {
                return Err(self.invalid("parameters must be a JSON object"));
            }
        };

        let mut path = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            path.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or_else(|| self.invalid("unterminated placeholder"))?;
            let name = &after[..end];
            let value = remaining
                .remove(name)
                .ok_or_else(|| self.invalid(&format!("missing parameter '{}'", name)))?;
            path.push_str(&encode_segment(&placeholder_value(name, &value, self)?));
            rest = &after[end + 1..];
        }
        path.push_str(rest);

        let body = if remaining.is_empty() {
            None
        } else if self.method == Method::GET {
            path.push('?');
            path.push_str(&query_string(&remaining));
            None
        } else {
            Some(Value::Object(remaining))
        };

        Ok(ExpandedRoute {
            method: self.method.clone(),
            path,
            body,
        })
    }

    fn invalid(&self, reason: &str) -> Error {
        invalid(&format!("{} {}", self.method, self.template), reason)
    }
}

fn invalid(route: &str, reason: &str) -> Error {
    Error::InvalidRoute {
        route: route.to_string(),
        reason: reason.to_string(),
    }
}

fn placeholder_value(name: &str, value: &Value, route: &Route) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(route.invalid(&format!(
            "parameter '{}' cannot be used in a path",
            name
        ))),
    }
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        // form encoding uses '+' for spaces, paths need '%20'
        .replace('+', "%20")
}

fn query_string(params: &Map<String, Value>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::String(s) => serializer.append_pair(key, s),
            Value::Null => continue,
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    serializer.finish()
}
