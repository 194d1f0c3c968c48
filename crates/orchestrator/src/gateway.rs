//! Validates user input and forwards named commands to the backend.

use std::{fmt, sync::Arc};

use chrono::{Local, TimeZone};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{Command, Operation, Statistics},
    protocol::commands,
};

use crate::{
    error::{non_empty_or_unknown, GatewayError},
    providers::Backend,
};

pub const MISSING_NUMBERS: &str = "please enter both numbers";
pub const INVALID_NUMBERS: &str = "please enter valid numbers";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
    pub value: f64,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            self.a,
            self.operation.symbol(),
            self.b,
            self.value
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: u64,
    pub formatted: String,
}

#[derive(Clone)]
pub struct CommandGateway {
    backend: Arc<dyn Backend>,
}

impl CommandGateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Sends `command` as-is. Backend failures are surfaced verbatim and
    /// never retried.
    pub async fn invoke(&self, command: Command) -> Result<Value, GatewayError> {
        let name = command.name.clone();
        match self.backend.invoke(command).await {
            Ok(value) => {
                tracing::debug!(command = %name, "backend command succeeded");
                Ok(value)
            }
            Err(err) => {
                tracing::info!(command = %name, code = ?err.code, reason = %err.message, "backend command failed");
                Err(GatewayError::Backend(non_empty_or_unknown(err.message)))
            }
        }
    }

    pub async fn invoke_as<T: DeserializeOwned>(&self, command: Command) -> Result<T, GatewayError> {
        let name = command.name.clone();
        let value = self.invoke(command).await?;
        serde_json::from_value(value).map_err(|err| GatewayError::Decode {
            command: name,
            reason: err.to_string(),
        })
    }

    pub async fn greet(&self, name: &str) -> Result<String, GatewayError> {
        self.invoke_as(Command::new(commands::GREET).arg("name", name))
            .await
    }

    pub async fn calculate(
        &self,
        operation: Operation,
        a: &str,
        b: &str,
    ) -> Result<Calculation, GatewayError> {
        let (a, b) = parse_operands(a, b)?;
        let command = Command::new(commands::CALCULATE)
            .arg("operation", operation.as_str())
            .arg("a", a)
            .arg("b", b);
        let value = self.invoke_as::<f64>(command).await?;
        Ok(Calculation {
            operation,
            a,
            b,
            value,
        })
    }

    pub async fn safe_divide(&self, a: &str, b: &str) -> Result<Calculation, GatewayError> {
        let (a, b) = parse_operands(a, b)?;
        let command = Command::new(commands::SAFE_DIVIDE).arg("a", a).arg("b", b);
        let value = self.invoke_as::<f64>(command).await?;
        Ok(Calculation {
            operation: Operation::Divide,
            a,
            b,
            value,
        })
    }

    pub async fn timestamp(&self) -> Result<Timestamp, GatewayError> {
        let seconds = self
            .invoke_as::<u64>(Command::new(commands::GET_TIMESTAMP))
            .await?;
        Ok(Timestamp {
            seconds,
            formatted: format_local(seconds),
        })
    }

    pub async fn system_info(&self) -> Result<String, GatewayError> {
        self.invoke_as(Command::new(commands::GET_SYSTEM_INFO))
            .await
    }

    /// `Ok(None)` when the input holds no usable number; the backend is not
    /// contacted in that case.
    pub async fn process_numbers(&self, input: &str) -> Result<Option<Statistics>, GatewayError> {
        let numbers = parse_number_list(input);
        if numbers.is_empty() {
            tracing::debug!("no numbers to process; clearing statistics");
            return Ok(None);
        }

        let command = Command::new(commands::PROCESS_NUMBERS).arg("numbers", numbers);
        self.invoke_as(command).await.map(Some)
    }
}

pub fn parse_operands(a: &str, b: &str) -> Result<(f64, f64), GatewayError> {
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return Err(GatewayError::Validation(MISSING_NUMBERS.to_string()));
    }

    match (parse_number(a), parse_number(b)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(GatewayError::Validation(INVALID_NUMBERS.to_string())),
    }
}

/// Splits a comma separated list, dropping tokens that are not finite numbers.
pub fn parse_number_list(input: &str) -> Vec<f64> {
    input
        .split(',')
        .filter_map(|token| parse_number(token.trim()))
        .filter(|n| n.is_finite())
        .collect()
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn format_local(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
