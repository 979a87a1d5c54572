//! Identifier rules for streams and tables.
//!
//! Ids end up as map keys in the document and as names in deployment configs, so
//! they are restricted to `[A-Za-z0-9_.-]`.

use crate::Result;
use crate::diagnostics;
use anyhow::bail;
use regex::Regex;

const ID_RE: &str = r"^[A-Za-z0-9_.\-]+$";

#[derive(Debug, Clone)]
pub struct IdRules {
    re: Regex,
}

impl IdRules {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(ID_RE)?,
        })
    }

    /// Fail unless `id` is a valid identifier. `what` names it in the message.
    pub fn check(&self, what: &str, id: &str) -> Result<()> {
        if !self.re.is_match(id) {
            bail!(
                "{}",
                diagnostics::error_message(format!(
                    "invalid {} id {:?}: only letters, digits, '_', '.' and '-' are allowed",
                    what, id
                ))
            );
        }
        Ok(())
    }
}
