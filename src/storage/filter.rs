//! Predicate evaluation against in-memory rows.
//!
//! Structured predicates are evaluated directly; raw SQL fragments are
//! parsed with sqlparser (generic dialect) and interpreted with SQL
//! comparison semantics (`NULL` never matches a comparison, `?` placeholders
//! bind positionally).

use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator, Value as SqlValue};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::core::{Error, Predicate, RawClause, ResourceDescriptor, Result, Row, Value};

const OP: &str = "memstore.predicate";

pub(crate) fn row_matches(desc: &ResourceDescriptor, row: &Row, pred: &Predicate) -> Result<bool> {
    match pred {
        Predicate::Eq(pairs) => pairs_match(desc, row, pairs),
        Predicate::AnyOf(tuples) => {
            for pairs in tuples {
                if pairs_match(desc, row, pairs)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Raw(raw) => eval_raw(desc, row, raw),
        Predicate::And(parts) => {
            for p in parts {
                if !row_matches(desc, row, p)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn pairs_match(desc: &ResourceDescriptor, row: &Row, pairs: &[(String, Value)]) -> Result<bool> {
    for (name, value) in pairs {
        let idx = desc.find_column_index(name).ok_or_else(|| {
            Error::internal(OP, format!("column '{}' not found in {}", name, desc.table()))
        })?;
        if row[idx] != *value {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_raw(desc: &ResourceDescriptor, row: &Row, raw: &RawClause) -> Result<bool> {
    let expr = parse_clause(&raw.clause)?;
    let mut binder = ArgBinder::new(&raw.args);
    let value = eval_expr(desc, row, &expr, &mut binder)?;
    Ok(value.as_bool())
}

/// Evaluates a scalar SQL expression (a conflict-action value expression)
/// against a stored row.
pub(crate) fn eval_value_expr(
    desc: &ResourceDescriptor,
    row: &Row,
    expr_sql: &str,
    args: &[Value],
) -> Result<Value> {
    let expr = parse_clause(expr_sql)?;
    let mut binder = ArgBinder::new(args);
    eval_expr(desc, row, &expr, &mut binder)
}

fn parse_clause(clause: &str) -> Result<Expr> {
    let dialect = GenericDialect {};
    Parser::new(&dialect)
        .try_with_sql(clause)
        .and_then(|mut p| p.parse_expr())
        .map_err(|e| Error::invalid_parameter(OP, format!("cannot parse '{clause}': {e}")))
}

struct ArgBinder<'a> {
    args: &'a [Value],
    next: usize,
}

impl<'a> ArgBinder<'a> {
    fn new(args: &'a [Value]) -> Self {
        Self { args, next: 0 }
    }

    fn take(&mut self) -> Result<Value> {
        let arg = self
            .args
            .get(self.next)
            .cloned()
            .ok_or_else(|| Error::invalid_parameter(OP, "missing argument for placeholder"))?;
        self.next += 1;
        Ok(arg)
    }
}

fn eval_expr(
    desc: &ResourceDescriptor,
    row: &Row,
    expr: &Expr,
    binder: &mut ArgBinder<'_>,
) -> Result<Value> {
    match expr {
        Expr::Nested(inner) => eval_expr(desc, row, inner, binder),
        Expr::Value(v) => literal_value(&v.value, binder),
        Expr::Identifier(ident) => column_value(desc, row, &ident.value),
        Expr::CompoundIdentifier(parts) => {
            let name = parts
                .last()
                .map(|i| i.value.as_str())
                .ok_or_else(|| Error::invalid_parameter(OP, "empty compound identifier"))?;
            column_value(desc, row, name)
        }
        Expr::IsNull(inner) => {
            let v = eval_expr(desc, row, inner, binder)?;
            Ok(Value::Boolean(v.is_null()))
        }
        Expr::IsNotNull(inner) => {
            let v = eval_expr(desc, row, inner, binder)?;
            Ok(Value::Boolean(!v.is_null()))
        }
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match eval_expr(desc, row, inner, binder)? {
            Value::Integer(i) => Ok(Value::Integer(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(Error::invalid_parameter(
                OP,
                format!("cannot negate {}", other.type_name()),
            )),
        },
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: inner,
        } => {
            let v = eval_expr(desc, row, inner, binder)?;
            Ok(Value::Boolean(!v.as_bool()))
        }
        Expr::BinaryOp { left, op, right } => {
            // both sides evaluated unconditionally so placeholder binding
            // stays positional
            let lhs = eval_expr(desc, row, left, binder)?;
            let rhs = eval_expr(desc, row, right, binder)?;
            binary_op(&lhs, op, &rhs)
        }
        other => Err(Error::invalid_parameter(
            OP,
            format!("unsupported expression: {other}"),
        )),
    }
}

fn literal_value(value: &SqlValue, binder: &mut ArgBinder<'_>) -> Result<Value> {
    match value {
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Boolean(b) => Ok(Value::Boolean(*b)),
        SqlValue::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Ok(Value::Integer(i))
            } else {
                n.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| Error::invalid_parameter(OP, format!("bad numeric literal {n}")))
            }
        }
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
            Ok(Value::Text(s.clone()))
        }
        SqlValue::Placeholder(_) => binder.take(),
        other => Err(Error::invalid_parameter(
            OP,
            format!("unsupported literal: {other}"),
        )),
    }
}

fn column_value(desc: &ResourceDescriptor, row: &Row, name: &str) -> Result<Value> {
    let idx = desc.find_column_index(name).ok_or_else(|| {
        Error::internal(OP, format!("column '{}' not found in {}", name, desc.table()))
    })?;
    Ok(row[idx].clone())
}

fn binary_op(lhs: &Value, op: &BinaryOperator, rhs: &Value) -> Result<Value> {
    use std::cmp::Ordering;

    match op {
        BinaryOperator::And => Ok(Value::Boolean(lhs.as_bool() && rhs.as_bool())),
        BinaryOperator::Or => Ok(Value::Boolean(lhs.as_bool() || rhs.as_bool())),
        BinaryOperator::Eq
        | BinaryOperator::NotEq
        | BinaryOperator::Lt
        | BinaryOperator::LtEq
        | BinaryOperator::Gt
        | BinaryOperator::GtEq => {
            // SQL semantics: a comparison with NULL never matches
            if lhs.is_null() || rhs.is_null() {
                return Ok(Value::Boolean(false));
            }
            let matched = match (op, lhs.partial_cmp(rhs)) {
                (BinaryOperator::Eq, Some(Ordering::Equal)) => true,
                (BinaryOperator::NotEq, Some(ord)) => ord != Ordering::Equal,
                (BinaryOperator::Lt, Some(Ordering::Less)) => true,
                (BinaryOperator::LtEq, Some(ord)) => ord != Ordering::Greater,
                (BinaryOperator::Gt, Some(Ordering::Greater)) => true,
                (BinaryOperator::GtEq, Some(ord)) => ord != Ordering::Less,
                _ => false,
            };
            Ok(Value::Boolean(matched))
        }
        other => Err(Error::invalid_parameter(
            OP,
            format!("unsupported operator: {other}"),
        )),
    }
}
