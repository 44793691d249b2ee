use serde_json::{Map, Value};

use crate::errors::BrokerError;

/// Typed view of the provision parameter bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionParameters {
    pub name: String,
    pub description: String,
    pub capacity: i64,
}

impl ProvisionParameters {
    pub const NAME: &'static str = "name";
    pub const DESCRIPTION: &'static str = "description";
    pub const CAPACITY: &'static str = "capacity";

    /// `name` and `description` default to empty; `capacity` is required and
    /// must be a non-negative whole number.
    pub fn from_map(params: &Map<String, Value>) -> Result<Self, BrokerError> {
        let name = optional_string(params, Self::NAME)?;
        let description = optional_string(params, Self::DESCRIPTION)?;
        let capacity = match params.get(Self::CAPACITY) {
            None | Some(Value::Null) => return Err(BrokerError::MissingParameter(Self::CAPACITY.to_string())),
            Some(v) => capacity_from(v)?,
        };
        Ok(Self { name, description, capacity })
    }
}

fn optional_string(params: &Map<String, Value>, key: &str) -> Result<String, BrokerError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(BrokerError::invalid(key, format!("expected a string, got {other}"))),
    }
}

fn capacity_from(value: &Value) -> Result<i64, BrokerError> {
    let key = ProvisionParameters::CAPACITY;
    let Value::Number(n) = value else {
        return Err(BrokerError::invalid(key, format!("expected a number, got {value}")));
    };
    let capacity = if let Some(i) = n.as_i64() {
        i
    } else if let Some(f) = n.as_f64() {
        // JSON clients commonly send 5.0 for 5
        if f.fract() != 0.0 || f < i64::MIN as f64 || f > i64::MAX as f64 {
            return Err(BrokerError::invalid(key, format!("{n} is not a whole number")));
        }
        f as i64
    } else {
        return Err(BrokerError::invalid(key, format!("{n} is out of range")));
    };
    if capacity < 0 {
        return Err(BrokerError::invalid(key, "must not be negative"));
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn defaults_name_and_description() {
        let p = ProvisionParameters::from_map(&bag(json!({"capacity": 5}))).unwrap();
        assert_eq!(p, ProvisionParameters { name: String::new(), description: String::new(), capacity: 5 });
    }

    #[test]
    fn reads_all_fields() {
        let p = ProvisionParameters::from_map(&bag(json!({"name": "n", "description": "d", "capacity": 2.0})))
            .unwrap();
        assert_eq!(p.name, "n");
        assert_eq!(p.description, "d");
        assert_eq!(p.capacity, 2);
    }

    #[test]
    fn missing_capacity() {
        let err = ProvisionParameters::from_map(&bag(json!({"name": "n"}))).unwrap_err();
        assert_eq!(err, BrokerError::MissingParameter("capacity".into()));

        let err = ProvisionParameters::from_map(&bag(json!({"capacity": null}))).unwrap_err();
        assert_eq!(err, BrokerError::MissingParameter("capacity".into()));
    }

    #[test]
    fn rejects_non_numeric_or_bad_capacity() {
        for bad in [json!("5"), json!(true), json!([1]), json!(1.5), json!(-1), json!(1e300)] {
            let err = ProvisionParameters::from_map(&bag(json!({"capacity": bad}))).unwrap_err();
            assert!(matches!(err, BrokerError::InvalidParameter { ref name, .. } if name == "capacity"), "{err}");
        }
    }

    #[test]
    fn rejects_non_string_name() {
        let err = ProvisionParameters::from_map(&bag(json!({"name": 7, "capacity": 1}))).unwrap_err();
        assert!(err.is_caller_error());
    }
}
