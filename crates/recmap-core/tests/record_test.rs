//! Integration test: end-to-end record normalization
//!
//! Declares a realistic contact schema mixing keyed fields, choice
//! translation, method dispatch, and coercion helpers, then exercises
//! the full record lifecycle against raw JSON input.

use recmap_convert::{as_date, as_factor, as_number, as_string};
use recmap_core::{ChoiceKeyField, Field, KeyField, Mapped, Record, Schema};
use recmap_value::{Datum, Patch, Status, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

fn contact_schema() -> Arc<Schema> {
    Schema::builder("Contact")
        .field(
            "id",
            KeyField::new().func(|_owner, _raw, datum| Ok(as_number(&datum)?.into())),
        )
        .field(
            "name",
            KeyField::new()
                .key("full_name")
                .blank(false)
                .func(|_owner, _raw, datum| Ok(as_string(&datum)?.into())),
        )
        .field(
            "gender",
            ChoiceKeyField::new()
                .choices([("M", "Male"), ("F", "Female")]),
        )
        .field(
            "country",
            KeyField::new().func(|_owner, _raw, datum| Ok(as_factor(&datum)?.into())),
        )
        .field(
            "joined",
            KeyField::new()
                .key("joined_on")
                .func(|_owner, _raw, datum| Ok(as_date(&datum)?.into())),
        )
        .field("greeting", Field::new().method("greet"))
        .extract_method("greet", |owner, _raw| {
            let name = owner.get("name").map_err(Box::new)?;
            Ok(Mapped::raw(format!("Hello, {name}!")))
        })
        .build()
}

fn raw_contact() -> BTreeMap<String, Datum> {
    let json = serde_json::json!({
        "id": "7",
        "full_name": "  Ada Lovelace  ",
        "gender": "F",
        "country": " uk ",
        "joined_on": "2015-01-01",
    });
    let serde_json::Value::Object(map) = json else {
        unreachable!()
    };
    map.into_iter().map(|(k, v)| (k, Datum::from(v))).collect()
}

#[test]
fn test_end_to_end_normalization() {
    let record = Record::new(contact_schema(), raw_contact());

    assert_eq!(record.get("id").unwrap(), Datum::Decimal(7.0));
    assert_eq!(record.get("name").unwrap(), Datum::from("Ada Lovelace"));
    assert_eq!(record.get("gender").unwrap(), Datum::from("Female"));
    assert_eq!(record.get("country").unwrap(), Datum::from("UK"));
    assert_eq!(
        record.get("joined").unwrap(),
        Datum::Date(chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap())
    );
    assert_eq!(
        record.get("greeting").unwrap(),
        Datum::from("Hello, Ada Lovelace!")
    );
}

#[test]
fn test_caching_and_recompute() {
    let record = Record::new(contact_schema(), raw_contact());

    let first = record.getval("country").unwrap();
    let second = record.getval("country").unwrap();
    assert_eq!(first, second);

    record.setval("country", Datum::from("TR")).unwrap();
    assert_eq!(record.get("country").unwrap(), Datum::from("TR"));

    record.delval("country");
    assert_eq!(record.get("country").unwrap(), Datum::from("UK"));
}

#[test]
fn test_blank_policy_yields_error_value() {
    let mut raw = raw_contact();
    raw.insert("full_name".to_string(), Datum::from(""));
    let record = Record::new(contact_schema(), raw);

    let value = record.getval("name").unwrap();
    assert_eq!(value.status(), Status::Error);
    assert!(value.message().unwrap().contains("blank"));
    assert!(record.val_error("name").unwrap());

    // the rest of the record still resolves
    assert_eq!(record.get("gender").unwrap(), Datum::from("Female"));
}

#[test]
fn test_choice_miss_translates_to_null() {
    let mut raw = raw_contact();
    raw.insert("gender".to_string(), Datum::from("X"));
    let record = Record::new(contact_schema(), raw);

    let value = record.getval("gender").unwrap();
    assert!(value.value().is_null());
    assert_eq!(value.status(), Status::Success);
    assert!(record.val_none("gender").unwrap());
}

#[test]
fn test_renaming_precedence() {
    // the declaration name binds attribute access; the key binds the
    // raw lookup
    let record = Record::new(contact_schema(), raw_contact());

    assert!(record.has("name"));
    assert!(!record.has("full_name"));
    assert_eq!(record.get("name").unwrap(), Datum::from("Ada Lovelace"));
}

#[test]
fn test_override_with_patch() {
    let record = Record::new(contact_schema(), raw_contact());

    let stored = record
        .setval_with(
            "country",
            Datum::from("DE"),
            Patch::new()
                .status(Status::Warning)
                .message("backfilled from billing address")
                .extra("origin", "billing"),
        )
        .unwrap();

    assert_eq!(stored.status(), Status::Warning);
    assert!(record.val_warning("country").unwrap());
    assert_eq!(
        record.getval("country").unwrap().attr("origin").unwrap(),
        &Datum::from("billing")
    );
}

#[test]
fn test_override_boxed_value_keeps_payload() {
    let record = Record::new(contact_schema(), raw_contact());
    let boxed = Value::warning("N/A", "unverified").with_extra("checked", false);

    record.setval("country", boxed).unwrap();
    let value = record.getval("country").unwrap();
    assert_eq!(value.status(), Status::Warning);
    assert_eq!(value.attr("checked").unwrap(), &Datum::Boolean(false));
}

// Renewal seeds from the dictionary representation, which is keyed by
// field names. The round-trip guarantee therefore holds for schemas
// whose lookup keys match their field names and whose transforms are
// idempotent over their own output; profile_schema is such a schema.
fn profile_schema() -> Arc<Schema> {
    Schema::builder("Profile")
        .field("id", KeyField::new())
        .field("name", KeyField::new())
        .field(
            "country",
            KeyField::new().func(|_owner, _raw, datum| Ok(as_factor(&datum)?.into())),
        )
        .build()
}

fn raw_profile() -> BTreeMap<String, Datum> {
    [
        ("id".to_string(), Datum::Integer(7)),
        ("name".to_string(), Datum::from("Ada")),
        ("country".to_string(), Datum::from(" uk ")),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_renew_round_trip() {
    let schema = profile_schema();
    let record = Record::new(schema.clone(), raw_profile());

    // no overrides: the derived record resolves to the same dictionary
    let derived = Record::renew(schema.clone(), &record, Vec::<(String, Datum)>::new()).unwrap();
    assert_eq!(record.as_dict().unwrap(), derived.as_dict().unwrap());

    // the copy is independent of the source's cache
    record.setval("country", Datum::from("TR")).unwrap();
    assert_eq!(derived.get("country").unwrap(), Datum::from("UK"));
}

#[test]
fn test_renew_with_overrides() {
    let schema = profile_schema();
    let record = Record::new(schema.clone(), raw_profile());

    let derived = Record::renew(schema, &record, [("country", "fr")]).unwrap();
    // the override lands in the raw payload, so the transform still
    // runs over it
    assert_eq!(derived.get("country").unwrap(), Datum::from("FR"));
    assert_eq!(derived.get("name").unwrap(), record.get("name").unwrap());
}

#[test]
fn test_renew_across_differently_keyed_schemas() {
    // a schema with custom lookup keys does not round-trip into itself:
    // the dictionary is keyed by field names, not lookup keys, so the
    // derived record must use a schema keyed by those names
    let record = Record::new(contact_schema(), raw_contact());

    let by_field_name = Schema::builder("ContactSnapshot")
        .field("name", KeyField::new())
        .field("gender", KeyField::new())
        .field("joined", KeyField::new())
        .build();
    let derived =
        Record::renew(by_field_name, &record, Vec::<(String, Datum)>::new()).unwrap();

    assert_eq!(derived.get("name").unwrap(), Datum::from("Ada Lovelace"));
    assert_eq!(derived.get("gender").unwrap(), Datum::from("Female"));
    assert_eq!(
        derived.get("joined").unwrap(),
        Datum::Date(chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap())
    );

    // renewing into the original schema resolves through its custom
    // keys again, which the name-keyed dictionary does not populate
    let rekeyed = Record::renew(contact_schema(), &record, Vec::<(String, Datum)>::new()).unwrap();
    assert!(rekeyed.val_none("joined").unwrap());
}

#[test]
fn test_as_dict_detailed_serializes() {
    let record = Record::new(contact_schema(), raw_contact());

    let detailed = record.as_dict_detailed().unwrap();
    let json = serde_json::to_value(&detailed).unwrap();

    assert_eq!(json["country"]["value"], "UK");
    assert_eq!(json["country"]["status"], "success");
    assert_eq!(json["country"]["message"], serde_json::Value::Null);

    // sorted field names
    let names: Vec<&String> = detailed.keys().collect();
    assert_eq!(
        names,
        vec!["country", "gender", "greeting", "id", "joined", "name"]
    );
}

#[test]
fn test_unknown_field_and_method_failures() {
    let record = Record::new(contact_schema(), raw_contact());
    let err = record.get("nickname").unwrap_err();
    assert!(err.to_string().contains("nickname"));

    let broken = Schema::builder("Broken")
        .field("a", Field::new().method("missing"))
        .build();
    let record = Record::new(broken, BTreeMap::new());
    let err = record.get("a").unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_method_kind_mismatch_fails() {
    let schema = Schema::builder("Mismatch")
        .field("a", KeyField::new().method("extractor"))
        .extract_method("extractor", |_owner, _raw| Ok(Mapped::raw(1i64)))
        .build();
    let record = Record::new(schema, BTreeMap::new());

    let err = record.get("a").unwrap_err();
    assert!(err.to_string().contains("extractor"));
}

#[test]
fn test_schema_inheritance_end_to_end() {
    let base = contact_schema();
    let extended = Schema::builder("ContactWithNotes")
        .extends(&base)
        .field("notes", KeyField::new())
        .build();

    let mut raw = raw_contact();
    raw.insert("notes".to_string(), Datum::from("met at FOSDEM"));
    let record = Record::new(extended, raw);

    assert_eq!(record.get("gender").unwrap(), Datum::from("Female"));
    assert_eq!(record.get("notes").unwrap(), Datum::from("met at FOSDEM"));
}
