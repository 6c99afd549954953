//! Role-attributed turns of ordered parts.
//!
//! ```rust
//! use gcontent::{Part, Role, Turn};
//!
//! let turn = Turn::user(vec![Part::text("hello")]);
//! assert_eq!(turn.role, Role::User);
//! assert_eq!(turn.text(), "hello");
//! ```

use serde::{Deserialize, Serialize};

use crate::part::{FunctionCall, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    pub fn user(parts: Vec<Part>) -> Self {
        Self::new(Role::User, parts)
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self::new(Role::Model, parts)
    }

    pub fn user_text(value: impl Into<String>) -> Self {
        Self::user(vec![Part::text(value)])
    }

    pub fn model_text(value: impl Into<String>) -> Self {
        Self::model(vec![Part::text(value)])
    }

    /// Concatenation of the turn's text parts, in order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .concat()
    }

    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(Part::as_function_call)
            .collect()
    }

    pub fn has_function_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|part| part.as_function_call().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_only_text_parts() {
        let turn = Turn::model(vec![
            Part::text("one"),
            Part::function_call("lookup", serde_json::json!({})),
            Part::text(" two"),
        ]);

        assert_eq!(turn.text(), "one two");
        assert_eq!(turn.function_calls().len(), 1);
        assert!(turn.has_function_calls());
    }

    #[test]
    fn role_constructors_assign_roles() {
        assert_eq!(Turn::user_text("q").role, Role::User);
        assert_eq!(Turn::model_text("a").role, Role::Model);
    }
}
