//! Options support.
//!
//! Motion vector coder settings are exposed as named options so they can be set
//! from command line style arguments. Unknown options are ignored by the handler.

use std::fmt;
use thiserror::Error;

use crate::codecs::{FracLayout, MVPrecision};

/// Option name for vector precision.
pub const MV_PRECISION_OPTION: &str = "mv_precision";
/// Option name for fractional part binarisation.
pub const FRAC_LAYOUT_OPTION: &str = "frac_layout";
/// Option name for tracking the largest coded vector.
pub const AUTO_MV_STEP_OPTION: &str = "auto_mv_step";

/// A list specifying option parsing and validating errors.
#[derive(Clone,Copy,Debug,PartialEq,Error)]
pub enum OptionError {
    /// Input is not intended for the current option definition.
    #[error("option name does not match")]
    WrongName,
    /// Option value is not in the expected format.
    #[error("option value has wrong format")]
    InvalidFormat,
    /// Option value was not in the range.
    #[error("option value is out of range")]
    InvalidValue,
    /// Parse error.
    #[error("option value can not be parsed")]
    ParseError,
}

/// A specialised `Result` type for option parsing/validation.
pub type OptionResult<T> = Result<T, OptionError>;

/// Option definition type.
#[derive(Debug)]
pub enum OptionDefinitionType {
    /// Option is a boolean value.
    Bool,
    /// Option is a string with an optional list of allowed values.
    String(Option<&'static [&'static str]>),
}

/// Option definition.
#[derive(Debug)]
pub struct OptionDefinition {
    pub name:           &'static str,
    pub description:    &'static str,
    pub opt_type:       OptionDefinitionType,
}

impl OptionDefinition {
    /// Tries to parse input string(s) as an option and returns new option and number of arguments used (1 or 2) on success.
    pub fn parse(&self, name: &str, value: Option<&str>) -> OptionResult<(CoderOption, usize)> {
        let name = name.strip_prefix("--").unwrap_or(name);
        if let Some(no_name) = name.strip_prefix("no") {
            if no_name == self.name {
                return match self.opt_type {
                        OptionDefinitionType::Bool => Ok((CoderOption { name: self.name, value: OptionValue::Bool(false) }, 1)),
                        _ => Err(OptionError::InvalidFormat),
                    };
            }
        }
        if name != self.name {
            return Err(OptionError::WrongName);
        }
        match self.opt_type {
            OptionDefinitionType::Bool => Ok((CoderOption { name: self.name, value: OptionValue::Bool(true) }, 1)),
            OptionDefinitionType::String(_) => {
                if let Some(strval) = value {
                    let opt = CoderOption { name: self.name, value: OptionValue::String(strval.to_string()) };
                    self.check(&opt)?;
                    Ok((opt, 2))
                } else {
                    Err(OptionError::ParseError)
                }
            },
        }
    }
    /// Checks whether input option conforms to the definition.
    pub fn check(&self, option: &CoderOption) -> OptionResult<()> {
        if option.name != self.name {
            return Err(OptionError::WrongName);
        }
        match (&self.opt_type, &option.value) {
            (OptionDefinitionType::Bool, OptionValue::Bool(_)) => Ok(()),
            (OptionDefinitionType::String(None), OptionValue::String(_)) => Ok(()),
            (OptionDefinitionType::String(Some(strings)), OptionValue::String(cur_str)) => {
                if strings.iter().any(|s| s == cur_str) {
                    Ok(())
                } else {
                    Err(OptionError::InvalidValue)
                }
            },
            _ => Err(OptionError::InvalidFormat),
        }
    }
}

impl fmt::Display for OptionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.opt_type {
            OptionDefinitionType::Bool => write!(f, "[no]{}: {}", self.name, self.description),
            OptionDefinitionType::String(Some(opts)) => write!(f, "{} {}: {}", self.name, opts.join("|"), self.description),
            OptionDefinitionType::String(None) => write!(f, "{} <string>: {}", self.name, self.description),
        }
    }
}

/// Option.
#[derive(Clone,Debug,PartialEq)]
pub struct CoderOption {
    pub name:   &'static str,
    pub value:  OptionValue,
}

/// A list of accepted option values.
#[derive(Debug,Clone,PartialEq)]
pub enum OptionValue {
    Bool(bool),
    String(String),
}

/// Trait for all objects that handle `CoderOption`.
pub trait OptionHandler {
    /// Returns the options recognised by current object.
    fn get_supported_options(&self) -> &[OptionDefinition];
    /// Passes options for the object to set (or ignore).
    fn set_options(&mut self, options: &[CoderOption]);
    /// Queries the current option value in the object (if present).
    fn query_option_value(&self, name: &str) -> Option<OptionValue>;
}

const CODER_OPTS: &[OptionDefinition] = &[
    OptionDefinition {
        name: MV_PRECISION_OPTION, description: "motion vector precision",
        opt_type: OptionDefinitionType::String(Some(&["full", "half", "quarter", "eighth"])) },
    OptionDefinition {
        name: FRAC_LAYOUT_OPTION, description: "fractional motion vector bits coding",
        opt_type: OptionDefinitionType::String(Some(&["split", "joint"])) },
    OptionDefinition {
        name: AUTO_MV_STEP_OPTION, description: "track largest motion vector for search step selection",
        opt_type: OptionDefinitionType::Bool },
];

/// Motion vector coder settings.
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct MVCoderOptions {
    pub precision:      MVPrecision,
    pub layout:         FracLayout,
    pub auto_mv_step:   bool,
}

impl MVCoderOptions {
    /// Creates settings from command line style arguments.
    pub fn from_args(args: &[&str]) -> OptionResult<Self> {
        let mut opts = Self::default();
        let mut parsed = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let mut found = false;
            for def in CODER_OPTS.iter() {
                match def.parse(args[i], args.get(i + 1).copied()) {
                    Ok((opt, nargs)) => {
                        parsed.push(opt);
                        i += nargs;
                        found = true;
                        break;
                    },
                    Err(OptionError::WrongName) => {},
                    Err(err) => return Err(err),
                }
            }
            if !found {
                return Err(OptionError::WrongName);
            }
        }
        opts.set_options(&parsed);
        Ok(opts)
    }
}

impl OptionHandler for MVCoderOptions {
    fn get_supported_options(&self) -> &[OptionDefinition] { CODER_OPTS }
    fn set_options(&mut self, options: &[CoderOption]) {
        for option in options.iter() {
            if !CODER_OPTS.iter().any(|def| def.check(option).is_ok()) {
                tracing::debug!(name = option.name, "ignoring option");
                continue;
            }
            match (option.name, &option.value) {
                (MV_PRECISION_OPTION, OptionValue::String(string)) => {
                    if let Ok(precision) = string.parse::<MVPrecision>() {
                        self.precision = precision;
                    }
                },
                (FRAC_LAYOUT_OPTION, OptionValue::String(string)) => {
                    if let Ok(layout) = string.parse::<FracLayout>() {
                        self.layout = layout;
                    }
                },
                (AUTO_MV_STEP_OPTION, OptionValue::Bool(bval)) => {
                    self.auto_mv_step = *bval;
                },
                _ => {},
            };
            tracing::debug!(name = option.name, value = ?option.value, "option set");
        }
    }
    fn query_option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            MV_PRECISION_OPTION => Some(OptionValue::String(self.precision.to_string())),
            FRAC_LAYOUT_OPTION => Some(OptionValue::String(self.layout.to_string())),
            AUTO_MV_STEP_OPTION => Some(OptionValue::Bool(self.auto_mv_step)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_option_validation() {
        let option = CoderOption { name: "option", value: OptionValue::String("test".to_string()) };
        let mut def = OptionDefinition { name: "option", description: "", opt_type: OptionDefinitionType::String(None) };
        assert!(def.check(&option).is_ok());
        def.opt_type = OptionDefinitionType::String(Some(&["a string", "test string"]));
        assert_eq!(def.check(&option), Err(OptionError::InvalidValue));
        def.opt_type = OptionDefinitionType::String(Some(&["a string", "test"]));
        assert!(def.check(&option).is_ok());
        def.opt_type = OptionDefinitionType::Bool;
        assert_eq!(def.check(&option), Err(OptionError::InvalidFormat));
        def.name = "option2";
        assert_eq!(def.check(&option), Err(OptionError::WrongName));
    }
    #[test]
    fn test_option_parsing() {
        let def = OptionDefinition { name: "option", description: "", opt_type: OptionDefinitionType::String(None) };
        assert_eq!(def.parse("--option", None), Err(OptionError::ParseError));
        assert_eq!(def.parse("--nooption", None), Err(OptionError::InvalidFormat));
        assert_eq!(def.parse("--other", Some("42")), Err(OptionError::WrongName));
        assert_eq!(def.parse("--option", Some("42")),
                   Ok((CoderOption { name: "option", value: OptionValue::String("42".to_string()) }, 2)));
        let def = OptionDefinition { name: "option", description: "", opt_type: OptionDefinitionType::Bool };
        assert_eq!(def.parse("option", None),
                   Ok((CoderOption { name: "option", value: OptionValue::Bool(true) }, 1)));
        assert_eq!(def.parse("nooption", None),
                   Ok((CoderOption { name: "option", value: OptionValue::Bool(false) }, 1)));
        assert_eq!(def.to_string(), "[no]option: ");
    }
    #[test]
    fn test_coder_options() {
        let mut opts = MVCoderOptions::default();
        assert_eq!(opts.precision, MVPrecision::EighthPel);
        assert_eq!(opts.layout, FracLayout::Split);
        assert!(!opts.auto_mv_step);

        opts.set_options(&[
                CoderOption { name: MV_PRECISION_OPTION, value: OptionValue::String("quarter".to_string()) },
                CoderOption { name: FRAC_LAYOUT_OPTION, value: OptionValue::String("diagonal".to_string()) },
                CoderOption { name: "key_int", value: OptionValue::Bool(true) },
                CoderOption { name: AUTO_MV_STEP_OPTION, value: OptionValue::Bool(true) },
            ]);
        assert_eq!(opts.precision, MVPrecision::QuarterPel);
        assert_eq!(opts.layout, FracLayout::Split);
        assert!(opts.auto_mv_step);
        assert_eq!(opts.query_option_value(MV_PRECISION_OPTION), Some(OptionValue::String("quarter".to_string())));
        assert_eq!(opts.query_option_value(AUTO_MV_STEP_OPTION), Some(OptionValue::Bool(true)));
        assert_eq!(opts.query_option_value("key_int"), None);
        assert_eq!(opts.get_supported_options().len(), 3);
    }
    #[test]
    fn test_from_args() {
        let opts = MVCoderOptions::from_args(&["--mv_precision", "half", "frac_layout", "joint", "--auto_mv_step"]).unwrap();
        assert_eq!(opts, MVCoderOptions { precision: MVPrecision::HalfPel, layout: FracLayout::Joint, auto_mv_step: true });
        let opts = MVCoderOptions::from_args(&["auto_mv_step", "--noauto_mv_step"]).unwrap();
        assert!(!opts.auto_mv_step);
        assert_eq!(MVCoderOptions::from_args(&["--mv_precision", "sixteenth"]), Err(OptionError::InvalidValue));
        assert_eq!(MVCoderOptions::from_args(&["--mv_precision"]), Err(OptionError::ParseError));
        assert_eq!(MVCoderOptions::from_args(&["--fast"]), Err(OptionError::WrongName));
    }
}
