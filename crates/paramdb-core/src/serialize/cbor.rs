use crate::serialize::{MAX_SNAPSHOT_BYTES, SerializeError};
use serde::{Serialize, de::DeserializeOwned};
use serde_cbor::{from_slice, to_vec};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Serialize a value into CBOR bytes.
pub(crate) fn serialize<T>(t: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    let bytes = to_vec(t).map_err(|e| SerializeError::Serialize(e.to_string()))?;

    if bytes.len() > MAX_SNAPSHOT_BYTES as usize {
        return Err(SerializeError::Serialize(
            "snapshot exceeds maximum allowed size".into(),
        ));
    }

    Ok(bytes)
}

/// Deserialize CBOR bytes into a value.
///
/// The payload is length-checked up front and the decode runs under
/// `catch_unwind`, so a corrupt or oversized blob surfaces as a
/// `SerializeError` instead of unwinding into the engine.
pub(crate) fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > MAX_SNAPSHOT_BYTES as usize {
        return Err(SerializeError::Deserialize(
            "payload exceeds maximum allowed size".into(),
        ));
    }

    let result = catch_unwind(AssertUnwindSafe(|| from_slice(bytes)));

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(SerializeError::Deserialize(err.to_string())),
        Err(_) => Err(SerializeError::Deserialize(
            "panic during CBOR deserialization".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{deserialize, serialize};
    use paramdb_types::Value;

    #[test]
    fn round_trips_values() {
        let value = Value::List(vec![Value::Int(1), Value::Text("two".into())]);

        let bytes = serialize(&value).expect("encode");
        let back: Value = deserialize(&bytes).expect("decode");

        assert_eq!(back, value);
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        let result: Result<Value, _> = deserialize(&[0xff, 0x00, 0x13, 0x37]);
        assert!(result.is_err());
    }
}
