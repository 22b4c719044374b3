//! Masking Scenario Tests
//!
//! End-to-end masking behavior over the default recognizer stack, including
//! the cases where stage order and in-place replacement shape the result.

use mailguard_classifiers::{demask, normalize, PiiMasker};
use mailguard_core::{Entity, EntityKind};

fn masker() -> PiiMasker {
    PiiMasker::new().unwrap()
}

#[test]
fn test_card_and_cvv_kept_apart() {
    let result = masker().mask("Card 4111 1111 1111 1111 CVV 123");

    assert_eq!(result.masked_text, "Card [credit_debit_no] CVV [cvv_no]");
    let found: Vec<(EntityKind, &str)> = result
        .entities
        .iter()
        .map(|e| (e.classification, e.entity.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (EntityKind::CreditDebitNo, "4111 1111 1111 1111"),
            (EntityKind::CvvNo, "123"),
        ]
    );
}

#[test]
fn test_name_and_email_introduction() {
    let result = masker().mask("Hi, my name is John Smith, my email is john@x.com");

    assert_eq!(result.masked_text, "Hi, my name is [full_name], my email is [email]");
    assert_eq!(
        result.entities,
        vec![
            Entity::new(15, 25, EntityKind::FullName, "John Smith"),
            Entity::new(40, 50, EntityKind::Email, "john@x.com"),
        ]
    );
}

#[test]
fn test_positions_follow_working_text() {
    let original = "Call 9876543210 about card 4111 1111 1111 1111";
    let result = masker().mask(original);

    assert_eq!(result.masked_text, "Call [phone_number] about card [credit_debit_no]");

    let card = &result.entities[1];
    assert_eq!(card.classification, EntityKind::CreditDebitNo);
    // Offset into the text after the phone number was masked.
    assert_eq!(card.position, (31, 50));
    assert_eq!(original.find("4111"), Some(27));
}

#[test]
fn test_repeated_dates_each_recorded() {
    let result = masker().mask("Born 01/02/1990, yes 01/02/1990");

    assert_eq!(result.masked_text, "Born [dob], yes [dob]");
    assert_eq!(result.count(EntityKind::Dob), 2);
    assert_eq!(result.entities[0].position, (5, 15));
    assert_eq!(result.entities[1].position, (21, 31));
}

#[test]
fn test_aadhaar_and_card_expiry() {
    let result = masker().mask("Aadhaar 1234 5678 9012, card expires 08/27 cvv 321");

    assert_eq!(
        result.masked_text,
        "Aadhaar [aadhar_num], card expires [expiry_no] cvv [cvv_no]"
    );
    assert_eq!(result.count(EntityKind::AadharNum), 1);
    assert_eq!(result.count(EntityKind::ExpiryNo), 1);
    assert_eq!(result.count(EntityKind::CvvNo), 1);
}

#[test]
fn test_clean_text_untouched() {
    let text = "The quarterly report is attached, thanks for the review.";
    let result = masker().mask(text);

    assert!(result.entities.is_empty());
    assert_eq!(result.masked_text, text);
}

#[test]
fn test_demask_round_trip() {
    let originals = [
        "Hi, my name is John Smith, my email is john@x.com",
        "Call 9876543210 about card 4111 1111 1111 1111",
        "Aadhaar 1234 5678 9012, card expires 08/27 cvv 321",
    ];

    for original in originals {
        let result = masker().mask(original);
        assert_eq!(demask(&result.masked_text, &result.entities), original);
    }
}

#[test]
fn test_placeholders_dropped_by_normalization() {
    let result = masker().mask("My name is Priya Shah and my phone is 9876543210");
    let normalized = normalize(&result.masked_text);

    assert_eq!(normalized, "name phone");
    assert_eq!(normalize(&normalized), normalized);
}

#[test]
fn test_grouped_indian_phone_numbers() {
    let result = masker().mask("Call 98765 43210 today or the office on 080-2345-6789");

    assert_eq!(result.masked_text, "Call [phone_number] today or the office on [phone_number]");
    let found: Vec<(EntityKind, &str)> = result
        .entities
        .iter()
        .map(|e| (e.classification, e.entity.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (EntityKind::PhoneNumber, "98765 43210"),
            (EntityKind::PhoneNumber, "080-2345-6789"),
        ]
    );
}

#[test]
fn test_aadhar_followed_by_cvv() {
    let result = masker().mask("Aadhaar 1234 5678 9012 123");

    assert_eq!(result.masked_text, "Aadhaar [aadhar_num] [cvv_no]");
    let kinds: Vec<EntityKind> = result.entities.iter().map(|e| e.classification).collect();
    assert_eq!(kinds, vec![EntityKind::AadharNum, EntityKind::CvvNo]);
}
