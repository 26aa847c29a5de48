//! Leaf literal formatting
//!
//! A format-per-type table turning provider values into source literals:
//! quoted strings, suffixed numbers, and constructor or parse calls for
//! library value types.

use crate::serializer::SymbolRefs;
use chrono::{Datelike, SecondsFormat};
use effigy_types::{LeafKind, TypeDescriptor, Value};

/// Rendering failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A leaf value does not fit its declared type
    #[error("cannot render {value} as {ty}")]
    LiteralMismatch {
        /// Declared type
        ty: String,
        /// Offending value (debug form)
        value: String,
    },

    /// A node kind appeared where it cannot be rendered
    #[error("unexpected {kind} node at {context}")]
    UnexpectedNode {
        /// Node kind tag
        kind: &'static str,
        /// Where it was found
        context: &'static str,
    },

    /// A named node has no declared symbol
    #[error("node of type {0} has no declared name")]
    MissingName(String),

    /// The tree has no root
    #[error("trace has no root")]
    EmptyTrace,
}

fn mismatch(ty: &TypeDescriptor, value: &Value) -> RenderError {
    RenderError::LiteralMismatch {
        ty: ty.to_string(),
        value: format!("{value:?}"),
    }
}

fn float_literal(v: f64, suffix: &str) -> String {
    format!("{v:?}{suffix}")
}

/// Render a leaf value declared as `ty`
///
/// Built-in leaf kinds use the per-kind table; enum and opaque leaves fall
/// back to the value's own shape.
///
/// # Errors
/// [`RenderError::LiteralMismatch`] when the value does not fit the type.
pub fn render_leaf(ty: &TypeDescriptor, value: &Value, refs: &mut SymbolRefs) -> Result<String, RenderError> {
    match ty {
        TypeDescriptor::Leaf(kind) => render_builtin(*kind, ty, value, refs),
        _ => render_by_value(ty, value, refs),
    }
}

fn render_builtin(
    kind: LeafKind,
    ty: &TypeDescriptor,
    value: &Value,
    refs: &mut SymbolRefs,
) -> Result<String, RenderError> {
    let text = match (kind, value) {
        (LeafKind::Bool, Value::Bool(b)) => b.to_string(),
        (LeafKind::Char, Value::Char(c)) => format!("{c:?}"),
        (LeafKind::String, Value::Str(s)) => format!("{s:?}.to_string()"),
        (LeafKind::I32, Value::Int(v)) => v.to_string(),
        (LeafKind::I8 | LeafKind::I16 | LeafKind::I64, Value::Int(v)) => {
            format!("{v}{}", kind.rust_name())
        }
        (LeafKind::U8 | LeafKind::U16 | LeafKind::U32 | LeafKind::U64, Value::UInt(v)) => {
            format!("{v}{}", kind.rust_name())
        }
        (LeafKind::F32, Value::Float(v)) => format!("{:?}f32", *v as f32),
        (LeafKind::F64, Value::Float(v)) => float_literal(*v, "f64"),
        (LeafKind::Uuid, Value::Uuid(id)) => {
            refs.import("uuid::Uuid");
            refs.qualify("Uuid::parse_str");
            format!("Uuid::parse_str({:?}).unwrap()", id.to_string())
        }
        (LeafKind::Date, Value::Date(date)) => {
            refs.import("chrono::NaiveDate");
            refs.qualify("NaiveDate::from_ymd_opt");
            format!(
                "NaiveDate::from_ymd_opt({}, {}, {}).unwrap()",
                date.year(),
                date.month(),
                date.day()
            )
        }
        (LeafKind::DateTime, Value::DateTime(at)) => {
            refs.import("chrono::DateTime");
            refs.import("chrono::Utc");
            format!(
                "{:?}.parse::<DateTime<Utc>>().unwrap()",
                at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            )
        }
        (LeafKind::Duration, Value::Duration(d)) => {
            refs.import("std::time::Duration");
            refs.qualify("Duration::from_millis");
            format!("Duration::from_millis({})", d.as_millis())
        }
        _ => return Err(mismatch(ty, value)),
    };
    Ok(text)
}

fn render_by_value(ty: &TypeDescriptor, value: &Value, refs: &mut SymbolRefs) -> Result<String, RenderError> {
    let text = match value {
        Value::Enum { ty: enum_ty, variant } => {
            if enum_ty.is_qualified() {
                refs.import(enum_ty.as_str());
            }
            let path = format!("{}::{variant}", enum_ty.short());
            refs.qualify(&path);
            path
        }
        Value::Bool(b) => b.to_string(),
        Value::Char(c) => format!("{c:?}"),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => float_literal(*v, ""),
        Value::Str(s) => format!("{s:?}.to_string()"),
        Value::Uuid(_) => return render_builtin(LeafKind::Uuid, ty, value, refs),
        Value::Date(_) => return render_builtin(LeafKind::Date, ty, value, refs),
        Value::DateTime(_) => return render_builtin(LeafKind::DateTime, ty, value, refs),
        Value::Duration(_) => return render_builtin(LeafKind::Duration, ty, value, refs),
        _ => return Err(mismatch(ty, value)),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};
    use effigy_types::TypeName;
    use std::time::Duration;
    use uuid::Uuid;

    fn render(kind: LeafKind, value: Value) -> (String, SymbolRefs) {
        let mut refs = SymbolRefs::default();
        let text = render_leaf(&TypeDescriptor::Leaf(kind), &value, &mut refs).unwrap();
        (text, refs)
    }

    #[test]
    fn strings_are_quoted_and_escaped() {
        let (text, _) = render(LeafKind::String, Value::Str("a\"b".into()));
        assert_eq!(text, r#""a\"b".to_string()"#);
    }

    #[test]
    fn integers_carry_suffix_except_i32() {
        assert_eq!(render(LeafKind::I32, Value::Int(-4)).0, "-4");
        assert_eq!(render(LeafKind::I64, Value::Int(7)).0, "7i64");
        assert_eq!(render(LeafKind::U8, Value::UInt(9)).0, "9u8");
    }

    #[test]
    fn floats_keep_decimal_point() {
        assert_eq!(render(LeafKind::F64, Value::Float(1.0)).0, "1.0f64");
        assert_eq!(render(LeafKind::F32, Value::Float(0.5)).0, "0.5f32");
    }

    #[test]
    fn library_types_wrap_calls_and_record_symbols() {
        let (text, refs) = render(LeafKind::Uuid, Value::Uuid(Uuid::from_u128(1)));
        assert_eq!(text, r#"Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap()"#);
        assert!(refs.imports.contains("uuid::Uuid"));
        assert!(refs.qualified.contains("Uuid::parse_str"));

        let date = NaiveDate::from_ymd_opt(2000, 1, 2).unwrap();
        assert_eq!(
            render(LeafKind::Date, Value::Date(date)).0,
            "NaiveDate::from_ymd_opt(2000, 1, 2).unwrap()"
        );

        let at: DateTime<Utc> = "2000-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(
            render(LeafKind::DateTime, Value::DateTime(at)).0,
            r#""2000-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()"#
        );

        assert_eq!(
            render(LeafKind::Duration, Value::Duration(Duration::from_millis(1500))).0,
            "Duration::from_millis(1500)"
        );
    }

    #[test]
    fn enum_renders_qualified_variant() {
        let mut refs = SymbolRefs::default();
        let value = Value::Enum {
            ty: TypeName::new("app::Status"),
            variant: "Shipped".into(),
        };
        let text = render_leaf(&TypeDescriptor::named("app::Status"), &value, &mut refs).unwrap();
        assert_eq!(text, "Status::Shipped");
        assert!(refs.imports.contains("app::Status"));
        assert!(refs.qualified.contains("Status::Shipped"));
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let mut refs = SymbolRefs::default();
        let err = render_leaf(&TypeDescriptor::Leaf(LeafKind::Bool), &Value::Int(1), &mut refs);
        assert!(matches!(err, Err(RenderError::LiteralMismatch { .. })));
    }
}
