//! Conditional plugins.
//!
//! A conditional shows its scope when the condition in its args holds and
//! evaluates to nothing otherwise.

use anyhow::{Context, bail};

use super::{
    IF_EQUAL, IF_FALSE, IF_GREATER, IF_NOT_EQUAL, IF_NOT_UNDEFINED, IF_SMALLER, IF_TRUE,
    IF_UNDEFINED, required_args,
};
use crate::types::{MacroValue, PluginInput, PluginOutput};

/// A binary comparison written in plugin args, e.g. `3>1` or `a===b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `a===b`, compared as text.
    Equal,
    /// `a===b`, negated.
    NotEqual,
    /// `a>b`, compared as numbers.
    Greater,
    /// `a<b`, compared as numbers.
    Smaller,
}

impl Comparison {
    /// The operator separating both operands.
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::Equal | Comparison::NotEqual => "===",
            Comparison::Greater => ">",
            Comparison::Smaller => "<",
        }
    }

    /// Evaluate the comparison written in `args`.
    pub fn evaluate(self, args: &str) -> anyhow::Result<bool> {
        let operator = self.operator();
        let Some((left, right)) = args.split_once(operator) else {
            bail!("expected '<left>{operator}<right>', got '{args}'");
        };
        let (left, right) = (left.trim(), right.trim());
        match self {
            Comparison::Equal => Ok(left == right),
            Comparison::NotEqual => Ok(left != right),
            Comparison::Greater => Ok(number(left)? > number(right)?),
            Comparison::Smaller => Ok(number(left)? < number(right)?),
        }
    }
}

fn number(operand: &str) -> anyhow::Result<f64> {
    operand
        .parse()
        .with_context(|| format!("'{operand}' is not a number"))
}

fn compare(
    name: &str,
    comparison: Comparison,
    input: PluginInput<'_>,
) -> anyhow::Result<PluginOutput> {
    let args = required_args(name, input.args)?;
    Ok(PluginOutput::scope_if(comparison.evaluate(args)?))
}

pub(super) fn if_equal(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    compare(IF_EQUAL, Comparison::Equal, input)
}

pub(super) fn if_not_equal(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    compare(IF_NOT_EQUAL, Comparison::NotEqual, input)
}

pub(super) fn if_greater(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    compare(IF_GREATER, Comparison::Greater, input)
}

pub(super) fn if_smaller(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    compare(IF_SMALLER, Comparison::Smaller, input)
}

fn boolean(name: &str, input: PluginInput<'_>) -> anyhow::Result<bool> {
    match required_args(name, input.args)?.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("'{other}' is neither 'true' nor 'false'"),
    }
}

pub(super) fn if_true(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    Ok(PluginOutput::scope_if(boolean(IF_TRUE, input)?))
}

pub(super) fn if_false(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    Ok(PluginOutput::scope_if(!boolean(IF_FALSE, input)?))
}

fn undefined(name: &str, input: PluginInput<'_>) -> anyhow::Result<bool> {
    let args = required_args(name, input.args)?;
    Ok(MacroValue::from(args.trim()).is_undefined())
}

pub(super) fn if_undefined(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    Ok(PluginOutput::scope_if(undefined(IF_UNDEFINED, input)?))
}

pub(super) fn if_not_undefined(input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
    Ok(PluginOutput::scope_if(!undefined(IF_NOT_UNDEFINED, input)?))
}
