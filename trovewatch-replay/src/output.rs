//! JSON line output for delivered state.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::error;
use trovewatch_sdk::chain::ChainError;

/// One delivered state, as printed to stdout.
#[derive(Debug, Serialize)]
pub struct StateUpdate<'a, T> {
    pub watch: &'a str,
    pub observed_at: OffsetDateTime,
    pub value: &'a T,
}

/// Build a watch callback that prints each state as a JSON line.
///
/// Failed reads are logged rather than printed.
pub fn printer<T>(watch: &'static str) -> impl Fn(Result<T, ChainError>) + Send + Sync + 'static
where
    T: Serialize + Send + 'static,
{
    move |result| match result {
        Ok(value) => {
            let update = StateUpdate {
                watch,
                observed_at: OffsetDateTime::now_utc(),
                value: &value,
            };
            match serde_json::to_string(&update) {
                Ok(line) => println!("{line}"),
                Err(e) => error!(watch, error = %e, "Failed to serialize state update"),
            }
        }
        Err(e) => error!(watch, error = %e, "Watch read failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_state_update_shape() {
        let value = Decimal::from(42);
        let update = StateUpdate {
            watch: "lusd_balance",
            observed_at: OffsetDateTime::UNIX_EPOCH,
            value: &value,
        };
        let json: serde_json::Value = serde_json::to_value(&update).unwrap();
        assert_eq!(json["watch"], "lusd_balance");
        assert_eq!(json["value"], "42");
        assert!(json["observed_at"].is_string());
    }
}
