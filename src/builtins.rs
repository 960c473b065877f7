//! Built-in operator and function tables.
//!
//! Tables are built per engine, so instances never share mutable
//! state. Binary handlers pop the right operand first, then the left,
//! and compute `left OP right`. Arithmetic wraps on overflow; only a
//! zero divisor is an error.

use serde_json::Value as JsonValue;

use crate::engine::{FunctionTable, Operator, OperatorTable};
use crate::error::EvalError;
use crate::token::{Token, TokenKind, TokenStack};

/// The default operator table.
pub fn default_operators() -> OperatorTable {
    let mut table = OperatorTable::new();
    table.insert(".".into(), Operator::new(140, false, json_descend));
    table.insert("**".into(), Operator::new(130, true, op_pow));
    table.insert("*".into(), Operator::new(120, false, op_mul));
    table.insert("/".into(), Operator::new(120, false, op_div));
    table.insert("%".into(), Operator::new(120, false, op_rem));
    table.insert("+".into(), Operator::new(110, false, op_add));
    table.insert("-".into(), Operator::new(110, false, op_sub));
    table.insert("!".into(), Operator::new(50, false, op_not));
    table.insert(">".into(), Operator::new(20, false, op_gt));
    table.insert(">=".into(), Operator::new(20, false, op_ge));
    table.insert("<".into(), Operator::new(20, false, op_lt));
    table.insert("<=".into(), Operator::new(20, false, op_le));
    table.insert("==".into(), Operator::new(20, false, op_eq));
    table.insert("!=".into(), Operator::new(20, false, op_ne));
    table.insert("&&".into(), Operator::new(10, false, op_and));
    table.insert("||".into(), Operator::new(0, false, op_or));
    table
}

/// The default function table.
pub fn default_functions() -> FunctionTable {
    let mut table = FunctionTable::new();
    table.insert("max".into(), Box::new(fn_max));
    table.insert("min".into(), Box::new(fn_min));
    table.insert("len".into(), Box::new(fn_len));
    table.insert("atoi".into(), Box::new(fn_atoi));
    table.insert("itoa".into(), Box::new(fn_itoa));
    table
}

/// Pop two number operands, right first, and push the computed result.
fn binary_ints(
    stack: &mut TokenStack,
    name: &str,
    op: impl Fn(i64, i64) -> Result<i64, EvalError>,
) -> Result<(), EvalError> {
    let rhs = stack.pop();
    let lhs = stack.pop();
    match (lhs.as_int(), rhs.as_int()) {
        (Some(a), Some(b)) => {
            stack.push(Token::int(op(a, b)?));
            Ok(())
        }
        _ => Err(EvalError::Type(format!(
            "'{}' expects number operands, got {} and {}",
            name,
            lhs.kind(),
            rhs.kind()
        ))),
    }
}

fn op_add(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "+", |a, b| Ok(a.wrapping_add(b)))
}

fn op_sub(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "-", |a, b| Ok(a.wrapping_sub(b)))
}

fn op_mul(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "*", |a, b| Ok(a.wrapping_mul(b)))
}

fn op_div(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "/", |a, b| {
        if b == 0 {
            return Err(EvalError::DivideByZero);
        }
        Ok(a.wrapping_div(b))
    })
}

fn op_rem(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "%", |a, b| {
        if b == 0 {
            return Err(EvalError::DivideByZero);
        }
        Ok(a.wrapping_rem(b))
    })
}

/// Exponentiation through f64, truncated back to an integer.
fn op_pow(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "**", |a, b| Ok((a as f64).powf(b as f64) as i64))
}

/// Unary bitwise complement.
fn op_not(stack: &mut TokenStack) -> Result<(), EvalError> {
    let operand = stack.pop();
    match operand.as_int() {
        Some(n) => {
            stack.push(Token::int(!n));
            Ok(())
        }
        None => Err(EvalError::Type(format!(
            "'!' expects a number operand, got {}",
            operand.kind()
        ))),
    }
}

fn op_gt(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, ">", |a, b| Ok(i64::from(a > b)))
}

fn op_ge(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, ">=", |a, b| Ok(i64::from(a >= b)))
}

fn op_lt(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "<", |a, b| Ok(i64::from(a < b)))
}

fn op_le(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "<=", |a, b| Ok(i64::from(a <= b)))
}

/// Two numbers compare by value; anything else compares by raw text.
fn tokens_equal(lhs: &Token, rhs: &Token) -> bool {
    match (lhs.as_int(), rhs.as_int()) {
        (Some(a), Some(b)) => a == b,
        _ => lhs.raw() == rhs.raw(),
    }
}

fn op_eq(stack: &mut TokenStack) -> Result<(), EvalError> {
    let rhs = stack.pop();
    let lhs = stack.pop();
    stack.push(Token::int(i64::from(tokens_equal(&lhs, &rhs))));
    Ok(())
}

fn op_ne(stack: &mut TokenStack) -> Result<(), EvalError> {
    let rhs = stack.pop();
    let lhs = stack.pop();
    stack.push(Token::int(i64::from(!tokens_equal(&lhs, &rhs))));
    Ok(())
}

fn op_and(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "&&", |a, b| Ok(i64::from(a != 0 && b != 0)))
}

fn op_or(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "||", |a, b| Ok(i64::from(a != 0 || b != 0)))
}

/// JSON strings push their contents; other values their serialization,
/// so chained descent keeps working on nested containers.
fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The `.` operator: one navigation step into a JSON document.
///
/// Pops the key, then the document. String and word keys index
/// objects, number keys index arrays.
fn json_descend(stack: &mut TokenStack) -> Result<(), EvalError> {
    let key = stack.pop();
    let doc = stack.pop();
    let parsed: JsonValue = serde_json::from_str(doc.raw())
        .map_err(|err| EvalError::Json(format!("invalid document: {}", err)))?;
    let element = if let Some(index) = key.as_int() {
        let array = parsed
            .as_array()
            .ok_or_else(|| EvalError::Json("number key needs an array".into()))?;
        let index = usize::try_from(index)
            .map_err(|_| EvalError::Json(format!("bad index {}", index)))?;
        array
            .get(index)
            .ok_or_else(|| EvalError::Json(format!("no element {}", index)))?
    } else if matches!(key.kind(), TokenKind::Str | TokenKind::Word) {
        let object = parsed
            .as_object()
            .ok_or_else(|| EvalError::Json("string key needs an object".into()))?;
        object
            .get(key.raw())
            .ok_or_else(|| EvalError::Json(format!("no field '{}'", key.raw())))?
    } else {
        return Err(EvalError::Type(format!(
            "'.' expects a string or number key, got {}",
            key.kind()
        )));
    };
    stack.push(Token::str(json_text(element)));
    Ok(())
}

fn fn_max(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "max", |a, b| Ok(a.max(b)))
}

fn fn_min(stack: &mut TokenStack) -> Result<(), EvalError> {
    binary_ints(stack, "min", |a, b| Ok(a.min(b)))
}

/// Byte length of the popped token's raw text, whatever its kind.
fn fn_len(stack: &mut TokenStack) -> Result<(), EvalError> {
    let operand = stack.pop();
    stack.push(Token::int(operand.raw().len() as i64));
    Ok(())
}

/// Parse a string or word token as an integer.
fn fn_atoi(stack: &mut TokenStack) -> Result<(), EvalError> {
    let operand = stack.pop();
    match operand.kind() {
        TokenKind::Str | TokenKind::Word => match operand.raw().parse::<i64>() {
            Ok(n) => {
                stack.push(Token::int(n));
                Ok(())
            }
            Err(_) => Err(EvalError::NotInteger(operand.raw().to_string())),
        },
        kind => Err(EvalError::Type(format!(
            "'atoi' expects a string operand, got {}",
            kind
        ))),
    }
}

/// Format a number token as a string.
fn fn_itoa(stack: &mut TokenStack) -> Result<(), EvalError> {
    let operand = stack.pop();
    match operand.as_int() {
        Some(n) => {
            stack.push(Token::str(n.to_string()));
            Ok(())
        }
        None => Err(EvalError::Type(format!(
            "'itoa' expects a number operand, got {}",
            operand.kind()
        ))),
    }
}
