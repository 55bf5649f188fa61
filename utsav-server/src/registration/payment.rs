//! Payment classification policy
//!
//! Pure functions of the event and the submitted participant set. The policy:
//! participants affiliated with the organizing institution are fee-exempt
//! except in the gaming category, where a payment notification is still
//! required; external participants always pay at the venue rather than in
//! advance.

use utsav_common::db::models::{Event, PaymentMode, PaymentStatus, TeamMember};

/// USN prefix identifying participants from the organizing institution
pub const HOME_USN_PREFIX: &str = "1si";

/// Classify the payment obligation for a submission.
///
/// An explicit override (venue point-of-sale flow) is trusted as-is and
/// short-circuits the policy.
pub fn classify(
    event: &Event,
    leader_usn: &str,
    team_members: &[TeamMember],
    explicit: Option<PaymentStatus>,
) -> PaymentStatus {
    if let Some(status) = explicit {
        return status;
    }

    if event.fees == 0 {
        return PaymentStatus::NotRequired;
    }

    let has_home_participant = is_home_institution(leader_usn)
        || team_members
            .iter()
            .any(|m| m.usn.as_deref().map_or(false, is_home_institution));

    if !has_home_participant {
        PaymentStatus::PayOnEventDay
    } else if event.category == "gaming" {
        PaymentStatus::PaymentRequired
    } else {
        PaymentStatus::NotRequired
    }
}

/// Case-insensitive USN prefix check for the organizing institution
fn is_home_institution(usn: &str) -> bool {
    usn.to_lowercase().starts_with(HOME_USN_PREFIX)
}

/// Recover a payment mode from free-text desk notes.
///
/// Fallback for venue submissions that carry no explicit mode; the desk
/// habitually writes "paid by cash" style notes.
pub fn payment_mode_from_notes(notes: &str) -> Option<PaymentMode> {
    let text = notes.to_lowercase();
    if text.contains("cash") {
        Some(PaymentMode::Cash)
    } else if text.contains("erp") {
        Some(PaymentMode::Erp)
    } else if text.contains("upi") {
        Some(PaymentMode::Upi)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn event(fees: i64, category: &str) -> Event {
        Event {
            guid: Uuid::new_v4(),
            name: "Test".to_string(),
            fees,
            category: category.to_string(),
            team_size: 1,
            min_team_size: None,
            max_team_size: None,
            is_variable_team_size: false,
            registration_open: true,
        }
    }

    fn member(usn: &str) -> TeamMember {
        TeamMember {
            usn: Some(usn.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn free_event_never_requires_payment() {
        let e = event(0, "gaming");
        assert_eq!(classify(&e, "1SI20CS001", &[], None), PaymentStatus::NotRequired);
        assert_eq!(classify(&e, "2AB20CS001", &[], None), PaymentStatus::NotRequired);
    }

    #[test]
    fn all_external_participants_pay_on_event_day() {
        let e = event(500, "music");
        let members = vec![member("2AB20CS002"), member("4CD20EC003")];
        assert_eq!(
            classify(&e, "2AB20CS001", &members, None),
            PaymentStatus::PayOnEventDay
        );
    }

    #[test]
    fn home_participant_in_gaming_event_requires_payment() {
        let e = event(500, "gaming");
        assert_eq!(
            classify(&e, "1SI20CS001", &[], None),
            PaymentStatus::PaymentRequired
        );
        // a single home member anywhere in the team triggers the same rule
        let members = vec![member("2AB20CS002"), member("1si21is042")];
        assert_eq!(
            classify(&e, "2AB20CS001", &members, None),
            PaymentStatus::PaymentRequired
        );
    }

    #[test]
    fn home_participant_outside_gaming_is_exempt() {
        let e = event(500, "dance");
        assert_eq!(classify(&e, "1SI20CS001", &[], None), PaymentStatus::NotRequired);
    }

    #[test]
    fn prefix_check_is_case_insensitive() {
        let e = event(500, "gaming");
        for usn in ["1si20cs001", "1SI20CS001", "1Si20Cs001"] {
            assert_eq!(classify(&e, usn, &[], None), PaymentStatus::PaymentRequired);
        }
    }

    #[test]
    fn explicit_override_is_trusted() {
        let e = event(500, "gaming");
        assert_eq!(
            classify(&e, "1SI20CS001", &[], Some(PaymentStatus::Completed)),
            PaymentStatus::Completed
        );
        // even for a free event
        let free = event(0, "music");
        assert_eq!(
            classify(&free, "2AB20CS001", &[], Some(PaymentStatus::Pending)),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn notes_sniffing_recovers_payment_mode() {
        assert_eq!(payment_mode_from_notes("Paid by CASH at desk 3"), Some(PaymentMode::Cash));
        assert_eq!(payment_mode_from_notes("erp receipt 1234"), Some(PaymentMode::Erp));
        assert_eq!(payment_mode_from_notes("UPI ref 98xx"), Some(PaymentMode::Upi));
        assert_eq!(payment_mode_from_notes("will pay later"), None);
    }
}
