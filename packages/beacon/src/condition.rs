//! The condition grammar: `[!] [selector] method(operand operator operand)`.
//!
//! A condition guards a handler. It is evaluated every time the handler fires, against the
//! element the handler is running for.

use std::fmt;
use std::str::FromStr;

use beacon_traits::{Dom, NodeId};
use thiserror::Error;

use crate::Diagnostics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// The query run against the resolved scope (`attr`, `data` or `text`)
    pub method: String,
    /// The query argument and the value the result is compared against
    pub operands: [String; 2],
    /// Kept as written. An unsupported operator parses fine and is only reported when the
    /// handler fires.
    pub operator: String,
    /// Narrows the scope. `None` evaluates against the target element itself.
    pub selector: Option<String>,
    /// Resolve `selector` against the whole document instead of within the target
    pub global: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("condition is empty")]
    Empty,
    #[error("condition has no method(...) clause")]
    MissingClause,
    #[error("condition clause has no method name")]
    MissingMethod,
    #[error("expected `operand operator operand`, found {0} tokens")]
    OperandCount(usize),
    #[error("unexpected input after the method(...) clause")]
    TrailingInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
}

impl Operator {
    pub fn compare(self, value: &str, expected: &str) -> bool {
        match self {
            Operator::Equals => value == expected,
            Operator::NotEquals => value != expected,
            Operator::Contains => value.contains(expected),
            Operator::NotContains => !value.contains(expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported operator {0}")]
pub struct UnsupportedOperator(String);

impl FromStr for Operator {
    type Err = UnsupportedOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "equals" => Operator::Equals,
            "!equals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            "!contains" => Operator::NotContains,
            _ => return Err(UnsupportedOperator(s.to_string())),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "!equals",
            Operator::Contains => "contains",
            Operator::NotContains => "!contains",
        })
    }
}

/// The queries a condition can run against its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    Attr,
    Data,
    Text,
}

impl Query {
    fn from_method(method: &str) -> Option<Self> {
        match method {
            "attr" => Some(Query::Attr),
            "data" => Some(Query::Data),
            "text" => Some(Query::Text),
            _ => None,
        }
    }

    fn run(self, dom: &dyn Dom, nodes: &[NodeId], argument: &str) -> Option<String> {
        match self {
            Query::Attr => dom.attr(*nodes.first()?, argument).map(str::to_string),
            Query::Data => {
                let name = format!("data-{argument}");
                dom.attr(*nodes.first()?, &name).map(str::to_string)
            }
            Query::Text if nodes.is_empty() => None,
            Query::Text => Some(nodes.iter().map(|&node| dom.text(node)).collect()),
        }
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConditionError::Empty);
        }
        let (global, input) = match input.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, input),
        };

        // The clause is the last parenthesized group
        let close = input.rfind(')').ok_or(ConditionError::MissingClause)?;
        if !input[close + 1..].trim().is_empty() {
            return Err(ConditionError::TrailingInput);
        }
        let open = input[..close]
            .rfind('(')
            .ok_or(ConditionError::MissingClause)?;

        let head = &input[..open];
        let method_start = head
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, c)| idx + c.len_utf8())
            .unwrap_or(0);
        let method = &head[method_start..];
        if method.is_empty() {
            return Err(ConditionError::MissingMethod);
        }
        let selector = head[..method_start].trim();

        let tokens: Vec<&str> = input[open + 1..close].split_whitespace().collect();
        let [left, operator, right] = tokens[..] else {
            return Err(ConditionError::OperandCount(tokens.len()));
        };

        Ok(Condition {
            method: method.to_string(),
            operands: [left.to_string(), right.to_string()],
            operator: operator.to_string(),
            selector: (!selector.is_empty()).then(|| selector.to_string()),
            global,
        })
    }
}

impl Condition {
    fn scope(&self, dom: &dyn Dom, target: NodeId) -> Vec<NodeId> {
        match &self.selector {
            None => vec![target],
            Some(selector) if self.global => dom.query_selector_all(selector),
            Some(selector) => dom.find(target, selector),
        }
    }

    /// Evaluate against `target`. Every failure (unknown method or operator, a missing value)
    /// is logged and evaluates to `false`.
    pub fn evaluate(&self, dom: &dyn Dom, target: NodeId, log: &Diagnostics) -> bool {
        let Some(query) = Query::from_method(&self.method) else {
            log.error(format_args!(
                "Method {} is not supported in conditions",
                self.method
            ));
            return false;
        };

        let nodes = self.scope(dom, target);
        let value = query.run(dom, &nodes, &self.operands[0]);
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            log.error(format_args!(
                "Null value for {}({}) on node {target}",
                self.method, self.operands[0]
            ));
            return false;
        };

        match self.operator.parse::<Operator>() {
            Ok(operator) => operator.compare(&value, &self.operands[1]),
            Err(err) => {
                log.error(format_args!("{err}"));
                false
            }
        }
    }
}

/// Parse a condition string, logging (and returning `None`) when it is malformed.
pub fn parse_condition(value: &str, log: &Diagnostics) -> Option<Condition> {
    match value.parse() {
        Ok(condition) => Some(condition),
        Err(err) => {
            log.warn(format_args!("Cannot parse condition {value:?}: {err}"));
            None
        }
    }
}
