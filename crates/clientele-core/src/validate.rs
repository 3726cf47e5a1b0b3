// ── Declarative field validation ──
//
// Each form declares a `Schema`: an ordered list of fields, each with a
// tagged rule set. Evaluation is pure and deterministic: the same values
// always produce the same `FieldErrors`, so forms re-run it on every edit.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Field name → message of the first rule that failed.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Read access to raw field values.
pub trait FieldSource {
    fn value(&self, field: &str) -> Option<&str>;
}

impl FieldSource for BTreeMap<&'static str, String> {
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

impl FieldSource for [(&str, &str)] {
    fn value(&self, field: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == field).map(|(_, v)| *v)
    }
}

/// A single constraint with its user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-blank.
    Required(&'static str),
    /// At least this many characters.
    MinLen(usize, &'static str),
    /// At most this many characters.
    MaxLen(usize, &'static str),
    /// Value must parse as an integer.
    Integer(&'static str),
    /// Integer value must be `>=` the bound.
    Min(i64, &'static str),
    /// Integer value must be `<=` the bound.
    Max(i64, &'static str),
    /// Value must look like an email address.
    Email(&'static str),
    /// Value must be one of the listed options (exact match).
    OneOf(&'static [&'static str], &'static str),
}

impl Rule {
    /// Check a non-blank value. `Required` always passes here; blank
    /// values are handled before individual rules run.
    fn check(&self, value: &str) -> Result<(), &'static str> {
        let ok = match *self {
            Self::Required(_) => true,
            Self::MinLen(n, _) => value.chars().count() >= n,
            Self::MaxLen(n, _) => value.chars().count() <= n,
            Self::Integer(_) => parse_int(value).is_some(),
            // Non-numeric input is the `Integer` rule's concern.
            Self::Min(bound, _) => parse_int(value).is_none_or(|v| v >= bound),
            Self::Max(bound, _) => parse_int(value).is_none_or(|v| v <= bound),
            Self::Email(_) => EMAIL_RE.is_match(value),
            Self::OneOf(options, _) => options.contains(&value),
        };
        if ok { Ok(()) } else { Err(self.message()) }
    }

    pub fn message(&self) -> &'static str {
        match *self {
            Self::Required(m)
            | Self::MinLen(_, m)
            | Self::MaxLen(_, m)
            | Self::Integer(m)
            | Self::Min(_, m)
            | Self::Max(_, m)
            | Self::Email(m)
            | Self::OneOf(_, m) => m,
        }
    }
}

/// Rules for one field, evaluated in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
    /// Check the value exactly as typed. Passwords are never trimmed.
    pub verbatim: bool,
}

impl FieldRules {
    /// First failing rule's message, if any.
    ///
    /// A blank value fails with the `Required` message when the field is
    /// required and otherwise skips every other rule.
    pub fn evaluate(&self, value: Option<&str>) -> Option<&'static str> {
        let value = match value {
            Some(v) if self.verbatim => v,
            Some(v) => v.trim(),
            None => "",
        };
        if value.is_empty() {
            return self.rules.iter().find_map(|r| match r {
                Rule::Required(m) => Some(*m),
                _ => None,
            });
        }
        self.rules.iter().find_map(|r| r.check(value).err())
    }
}

/// A form's complete rule set.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldRules],
}

impl Schema {
    pub const fn new(fields: &'static [FieldRules]) -> Self {
        Self { fields }
    }

    /// Declared field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// Evaluate every field, returning only the failures.
    pub fn validate<S: FieldSource + ?Sized>(&self, values: &S) -> FieldErrors {
        self.fields
            .iter()
            .filter_map(|f| f.evaluate(values.value(f.field)).map(|m| (f.field, m)))
            .collect()
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

// ── Schemas ──────────────────────────────────────────────────────────

pub const GENDERS: &[&str] = &["MALE", "FEMALE"];

const NAME: FieldRules = FieldRules {
    field: "name",
    verbatim: false,
    rules: &[
        Rule::MaxLen(15, "Must be 15 characters or less"),
        Rule::Required("Required"),
    ],
};

const EMAIL: FieldRules = FieldRules {
    field: "email",
    verbatim: false,
    rules: &[
        Rule::Email("Invalid email address"),
        Rule::Required("Required"),
    ],
};

const AGE: FieldRules = FieldRules {
    field: "age",
    verbatim: false,
    rules: &[
        Rule::Integer("Must be a number"),
        Rule::Min(16, "Must be at least 16 years of age"),
        Rule::Max(100, "Must be less than 100 years of age"),
        Rule::Required("Required"),
    ],
};

const CREATE_FIELDS: &[FieldRules] = &[
    NAME,
    EMAIL,
    AGE,
    FieldRules {
        field: "gender",
        verbatim: false,
        rules: &[
            Rule::OneOf(GENDERS, "Invalid gender type"),
            Rule::Required("Required"),
        ],
    },
    FieldRules {
        field: "password",
        verbatim: true,
        rules: &[
            Rule::MinLen(8, "Must be 8 characters or more"),
            Rule::MaxLen(20, "Must be 20 characters or less"),
        ],
    },
];

const UPDATE_FIELDS: &[FieldRules] = &[NAME, EMAIL, AGE];

const LOGIN_FIELDS: &[FieldRules] = &[
    FieldRules {
        field: "username",
        verbatim: false,
        rules: &[
            Rule::Email("Must be valid email"),
            Rule::Required("Email is required"),
        ],
    },
    FieldRules {
        field: "password",
        verbatim: true,
        rules: &[
            Rule::MaxLen(20, "Password cannot be more than 20 characters"),
            Rule::Required("Password is required"),
        ],
    },
];

/// Signup / create-customer form.
pub static CREATE_CUSTOMER: Schema = Schema::new(CREATE_FIELDS);

/// Update-customer form. Gender and id are immutable.
pub static UPDATE_CUSTOMER: Schema = Schema::new(UPDATE_FIELDS);

/// Login form.
pub static LOGIN: Schema = Schema::new(LOGIN_FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jane() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "Jane"),
            ("email", "jane@x.com"),
            ("age", "27"),
            ("gender", "MALE"),
            ("password", "abcdefgh"),
        ]
    }

    fn with(field: &'static str, value: &'static str) -> Vec<(&'static str, &'static str)> {
        jane()
            .into_iter()
            .map(|(k, v)| if k == field { (k, value) } else { (k, v) })
            .collect()
    }

    #[test]
    fn valid_signup_has_no_errors() {
        assert!(CREATE_CUSTOMER.validate(jane().as_slice()).is_empty());
    }

    #[test]
    fn underage_is_rejected_with_message() {
        let errors = CREATE_CUSTOMER.validate(with("age", "10").as_slice());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["age"], "Must be at least 16 years of age");
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(CREATE_CUSTOMER.validate(with("age", "16").as_slice()).is_empty());
        assert!(CREATE_CUSTOMER.validate(with("age", "100").as_slice()).is_empty());
        assert_eq!(
            CREATE_CUSTOMER.validate(with("age", "101").as_slice())["age"],
            "Must be less than 100 years of age"
        );
        assert_eq!(
            CREATE_CUSTOMER.validate(with("age", "twenty").as_slice())["age"],
            "Must be a number"
        );
    }

    #[test]
    fn blank_required_fields_report_required() {
        let errors = CREATE_CUSTOMER.validate(with("name", "  ").as_slice());
        assert_eq!(errors["name"], "Required");

        let errors = CREATE_CUSTOMER.validate([("password", "abcdefgh")].as_slice());
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec!["age", "email", "gender", "name"]
        );
    }

    #[test]
    fn optional_password_skips_rules_when_blank() {
        assert!(CREATE_CUSTOMER.validate(with("password", "").as_slice()).is_empty());
        assert_eq!(
            CREATE_CUSTOMER.validate(with("password", "short").as_slice())["password"],
            "Must be 8 characters or more"
        );
        assert_eq!(
            CREATE_CUSTOMER.validate(with("password", "abcdefghijklmnopqrstu").as_slice())
                ["password"],
            "Must be 20 characters or less"
        );
    }

    #[test]
    fn password_length_counts_surrounding_spaces() {
        assert_eq!(
            CREATE_CUSTOMER.validate(with("password", "  abcde").as_slice())["password"],
            "Must be 8 characters or more"
        );
        assert!(
            CREATE_CUSTOMER
                .validate(with("password", "  abcdef  ").as_slice())
                .is_empty()
        );
        assert!(LOGIN.validate([("username", "a@x.com"), ("password", "   ")].as_slice()).is_empty());
    }

    #[test]
    fn name_length_counts_characters() {
        assert!(CREATE_CUSTOMER.validate(with("name", "ÉÉÉÉÉÉÉÉÉÉÉÉÉÉÉ").as_slice()).is_empty());
        assert_eq!(
            CREATE_CUSTOMER.validate(with("name", "Bartholomew Jones").as_slice())["name"],
            "Must be 15 characters or less"
        );
    }

    #[test]
    fn gender_must_be_exact_option() {
        assert_eq!(
            CREATE_CUSTOMER.validate(with("gender", "OTHER").as_slice())["gender"],
            "Invalid gender type"
        );
        assert_eq!(
            CREATE_CUSTOMER.validate(with("gender", "male").as_slice())["gender"],
            "Invalid gender type"
        );
    }

    #[test]
    fn email_format() {
        for bad in ["jane", "jane@", "@x.com", "jane@x", "ja ne@x.com"] {
            assert_eq!(
                CREATE_CUSTOMER.validate(with("email", bad).as_slice())["email"],
                "Invalid email address",
                "{bad} should be rejected"
            );
        }
        assert!(
            CREATE_CUSTOMER
                .validate(with("email", "jane.doe+tag@mail.example.org").as_slice())
                .is_empty()
        );
    }

    #[test]
    fn login_messages() {
        let errors = LOGIN.validate([("username", "nope"), ("password", "")].as_slice());
        assert_eq!(errors["username"], "Must be valid email");
        assert_eq!(errors["password"], "Password is required");

        let errors = LOGIN.validate([("username", "")].as_slice());
        assert_eq!(errors["username"], "Email is required");
    }

    #[test]
    fn update_schema_ignores_gender() {
        assert!(!UPDATE_CUSTOMER.has_field("gender"));
        let values = [("name", "Jane"), ("email", "jane@x.com"), ("age", "40")];
        assert!(UPDATE_CUSTOMER.validate(values.as_slice()).is_empty());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let values = with("age", "10");
        let first = CREATE_CUSTOMER.validate(values.as_slice());
        let second = CREATE_CUSTOMER.validate(values.as_slice());
        assert_eq!(first, second);
    }
}
