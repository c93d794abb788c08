//! Combine strategies: merge several source values into one.

use crate::error::{PatchError, PatchResult};
use crate::format::sprintf;
use crate::model::{Combine, CombineStrategy};
use crate::value::Value;

/// A combine strategy together with its configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineStrategyConfig<'a> {
    /// Substitute the values, in variable order, into a format string.
    String { format: &'a str },
}

impl Combine {
    /// Resolve the strategy and its configuration block.
    ///
    /// Unknown strategies, and known strategies without their block, fail
    /// with [`PatchError::CombineConfigMissing`].
    pub fn strategy_config(&self) -> PatchResult<CombineStrategyConfig<'_>> {
        match (&self.strategy, &self.string) {
            (CombineStrategy::String, Some(config)) => Ok(CombineStrategyConfig::String {
                format: &config.format,
            }),
            (strategy, _) => Err(PatchError::CombineConfigMissing(strategy.to_string())),
        }
    }
}

/// Combine `values` into a single value.
pub fn combine(config: &CombineStrategyConfig<'_>, values: &[Value]) -> PatchResult<Value> {
    match config {
        CombineStrategyConfig::String { format } => {
            let combined = sprintf(format, values)?;
            Ok(Value::String(combined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::model::CombineVariable;

    #[test]
    fn test_string_combine() {
        let config = CombineStrategyConfig::String { format: "%s-%d" };
        let out = combine(&config, &["web".into(), Value::Int(3)]).unwrap();
        assert_eq!(out, Value::from("web-3"));
    }

    #[test]
    fn test_string_combine_arity_mismatch() {
        let config = CombineStrategyConfig::String { format: "%s-%s" };
        let err = combine(&config, &["a".into(), "b".into(), "c".into()]).unwrap_err();
        assert!(matches!(err, PatchError::Combine(FormatError::Arity { expected: 2, found: 3, .. })));
    }

    #[test]
    fn test_strategy_config_requires_block() {
        let combine = Combine {
            variables: vec![CombineVariable::new("a")],
            strategy: CombineStrategy::String,
            string: None,
        };
        assert_eq!(
            combine.strategy_config().unwrap_err(),
            PatchError::CombineConfigMissing("string".into())
        );
    }

    #[test]
    fn test_unknown_strategy_has_no_config() {
        let mut combine = Combine::string(["a"], "%s");
        combine.strategy = CombineStrategy::Unrecognized("lua".into());
        assert_eq!(
            combine.strategy_config().unwrap_err(),
            PatchError::CombineConfigMissing("lua".into())
        );
    }
}
