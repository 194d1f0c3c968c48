//! Privileged command surface reachable from the front-end by name.
//!
//! Every command is a pure function; [`dispatch`] decodes the JSON arguments
//! of a [`Command`], runs the matching function and encodes its result.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use shared::{
    domain::{Command, Operation, Statistics},
    error::{BackendError, ErrorCode},
    protocol::commands,
};

pub mod shell;

pub fn greet(name: &str) -> String {
    format!("Hello, {name}! You've been greeted from Rust!")
}

pub fn calculate(operation: &str, a: f64, b: f64) -> Result<f64, BackendError> {
    if a.is_nan() || b.is_nan() {
        return Err(BackendError::new(ErrorCode::InvalidNumber, "invalid number"));
    }
    if a.is_infinite() || b.is_infinite() {
        return Err(BackendError::new(ErrorCode::OutOfRange, "number out of range"));
    }

    match operation.parse::<Operation>()? {
        Operation::Add => finite(a + b),
        Operation::Subtract => finite(a - b),
        Operation::Multiply => finite(a * b),
        Operation::Divide => safe_divide(a, b),
    }
}

pub fn safe_divide(a: f64, b: f64) -> Result<f64, BackendError> {
    if b == 0.0 {
        Err(BackendError::division_by_zero())
    } else {
        finite(a / b)
    }
}

fn finite(value: f64) -> Result<f64, BackendError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BackendError::new(ErrorCode::OutOfRange, "result out of range"))
    }
}

/// Seconds since the Unix epoch.
pub fn get_timestamp() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

pub fn get_system_info() -> String {
    format!("Operating system: {}", std::env::consts::OS)
}

pub fn process_numbers(numbers: &[f64]) -> Result<Statistics, BackendError> {
    if numbers.is_empty() {
        return Ok(Statistics::default());
    }
    if numbers.iter().any(|n| !n.is_finite()) {
        return Err(BackendError::new(ErrorCode::OutOfRange, "number out of range"));
    }

    let sum = finite(numbers.iter().sum())?;
    let average = finite(sum / numbers.len() as f64)?;
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);

    Ok(Statistics {
        sum,
        average,
        max,
        min,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GreetArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CalculateArgs {
    operation: String,
    a: f64,
    b: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DivideArgs {
    a: f64,
    b: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProcessNumbersArgs {
    numbers: Vec<f64>,
}

/// Runs the command named by `command.name`.
pub fn dispatch(command: &Command) -> Result<Value, BackendError> {
    tracing::debug!(command = %command.name, "dispatching backend command");

    let value = match command.name.as_str() {
        commands::GREET => {
            let args: GreetArgs = decode_args(command)?;
            Value::from(greet(&args.name))
        }
        commands::CALCULATE => {
            let args: CalculateArgs = decode_args(command)?;
            Value::from(calculate(&args.operation, args.a, args.b)?)
        }
        commands::SAFE_DIVIDE => {
            let args: DivideArgs = decode_args(command)?;
            Value::from(safe_divide(args.a, args.b)?)
        }
        commands::GET_TIMESTAMP => {
            let _: NoArgs = decode_args(command)?;
            Value::from(get_timestamp())
        }
        commands::GET_SYSTEM_INFO => {
            let _: NoArgs = decode_args(command)?;
            Value::from(get_system_info())
        }
        commands::PROCESS_NUMBERS => {
            let args: ProcessNumbersArgs = decode_args(command)?;
            serde_json::to_value(process_numbers(&args.numbers)?)
                .map_err(|err| BackendError::new(ErrorCode::Internal, err.to_string()))?
        }
        other => {
            return Err(BackendError::new(
                ErrorCode::UnknownCommand,
                format!("unknown command: {other}"),
            ))
        }
    };

    Ok(value)
}

fn decode_args<T: DeserializeOwned>(command: &Command) -> Result<T, BackendError> {
    serde_json::from_value(Value::Object(command.args.clone()))
        .map_err(|err| BackendError::invalid_arguments(&command.name, err))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
