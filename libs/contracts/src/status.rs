use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Order lifecycle: Draft → Pending → Paid → Completed, with Canceled
/// reachable from every non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    Paid,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Draft, Canceled)
                | (Pending, Paid)
                | (Pending, Canceled)
                | (Paid, Completed)
                | (Paid, Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    #[test]
    fn test_allowed_transitions() {
        let allowed: Vec<(OrderStatus, OrderStatus)> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (OrderStatus::Draft, OrderStatus::Pending),
                (OrderStatus::Draft, OrderStatus::Canceled),
                (OrderStatus::Pending, OrderStatus::Paid),
                (OrderStatus::Pending, OrderStatus::Canceled),
                (OrderStatus::Paid, OrderStatus::Completed),
                (OrderStatus::Paid, OrderStatus::Canceled),
            ]
        );
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for status in [OrderStatus::Completed, OrderStatus::Canceled] {
            assert!(status.is_terminal());
            assert!(ALL.iter().all(|next| !status.can_transition_to(*next)));
        }
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::from_str("canceled").unwrap(), OrderStatus::Canceled);
        assert_eq!(
            serde_json::to_value(OrderStatus::Paid).unwrap(),
            serde_json::json!("paid")
        );
    }
}
