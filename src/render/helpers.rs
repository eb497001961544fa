//! Template helper functions.
//!
//! `sequence(start, end)` expands an inclusive integer range and the
//! `to_lower` filter lowercases a string. Both are registered on every
//! template environment built by [`TemplateSet`](super::TemplateSet).

use std::collections::HashMap;
use std::ops::RangeInclusive;
use tera::{Tera, Value};

/// Inclusive integer range `start..=end`, empty when `end < start`.
pub fn sequence(start: i64, end: i64) -> RangeInclusive<i64> {
    start..=end
}

/// Register the helpers on a template environment.
pub fn register(tera: &mut Tera) {
    tera.register_function("sequence", sequence_function);
    tera.register_filter("to_lower", to_lower_filter);
}

fn sequence_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let start = integer_arg(args, "start")?;
    let end = integer_arg(args, "end")?;
    Ok(Value::Array(sequence(start, end).map(Value::from).collect()))
}

fn integer_arg(args: &HashMap<String, Value>, name: &str) -> tera::Result<i64> {
    match args.get(name) {
        Some(value) => value.as_i64().ok_or_else(|| {
            tera::Error::msg(format!(
                "sequence: argument `{}` must be an integer, got {}",
                name, value
            ))
        }),
        None => Err(tera::Error::msg(format!(
            "sequence: missing argument `{}`",
            name
        ))),
    }
}

fn to_lower_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(s.to_lowercase())),
        other => Err(tera::Error::msg(format!(
            "to_lower: expected a string, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    fn render(template: &str, context: &Context) -> tera::Result<String> {
        let mut tera = Tera::default();
        register(&mut tera);
        tera.add_raw_template("t", template)?;
        tera.render("t", context)
    }

    #[test]
    fn test_sequence_is_inclusive() {
        assert_eq!(sequence(1, 3).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(sequence(0, 0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(sequence(2, 1).count(), 0);
    }

    #[test]
    fn test_sequence_in_template() {
        let mut context = Context::new();
        context.insert("n", &3);
        let template = "{% for i in sequence(start=1, end=n) %}{{ i }},{% endfor %}";
        let out = render(template, &context).unwrap();
        assert_eq!(out, "1,2,3,");
    }

    #[test]
    fn test_sequence_rejects_bad_arguments() {
        let mut context = Context::new();
        context.insert("n", "three");
        assert!(render("{% for i in sequence(start=1, end=n) %}{% endfor %}", &context).is_err());
        assert!(render("{% for i in sequence(start=1) %}{% endfor %}", &Context::new()).is_err());
    }

    #[test]
    fn test_to_lower_filter() {
        let mut context = Context::new();
        context.insert("ns", "HyperLedger");
        assert_eq!(render("{{ ns | to_lower }}", &context).unwrap(), "hyperledger");

        context.insert("ns", &7);
        assert!(render("{{ ns | to_lower }}", &context).is_err());
    }
}
