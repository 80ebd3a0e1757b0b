//! Strongly-typed value objects used by domain entities.
//!
//! Records carry these wrappers instead of raw primitives so identifiers,
//! text values, counters and monetary amounts are checked once at the
//! boundary (form submission or row loading) and trusted afterwards.

use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be positive was zero/negative or invalid.
    #[error("{0} must be greater than zero")]
    NonPositiveNumber(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// Email validation failed.
    #[error("{0} must be a valid email address")]
    InvalidEmail(&'static str),
    /// Text could not be parsed as a monetary amount.
    #[error("{0} must be a valid amount")]
    InvalidAmount(&'static str),
    /// A value outside of a closed enumerated set.
    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! counter_newtype {
    ($name:ident, $doc:expr, $field:expr, $min:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Constructs a counter enforcing its lower bound.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value >= $min {
                    Ok(Self(value))
                } else if $min > 0 {
                    Err(TypeConstraintError::NonPositiveNumber($field))
                } else {
                    Err(TypeConstraintError::NegativeNumber($field))
                }
            }

            /// Returns the raw `i32` value.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Closed string enumerations persisted as text columns.
///
/// Generates `as_str`, `ALL`, `Display` and strict `TryFrom<&str>` parsing so
/// unknown values are rejected when a form is submitted or a row is loaded.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $field:expr, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// String representation used in persistence and forms.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

id_newtype!(CompanyId, "Unique identifier for a company.", "company_id");
id_newtype!(VenueId, "Unique identifier for a venue.", "venue_id");
id_newtype!(
    PartyId,
    "Unique identifier for a client or supplier.",
    "party_id"
);
id_newtype!(ProjectId, "Unique identifier for a project.", "project_id");
id_newtype!(ContractId, "Unique identifier for a contract.", "contract_id");
id_newtype!(
    TicketTypeId,
    "Unique identifier for a ticket type.",
    "ticket_type_id"
);
id_newtype!(
    TicketSaleId,
    "Unique identifier for a ticket sale.",
    "ticket_sale_id"
);
id_newtype!(
    FinancialRecordId,
    "Unique identifier for a revenue or expense entry.",
    "financial_record_id"
);
id_newtype!(ClosingId, "Unique identifier for a period closing.", "closing_id");
id_newtype!(UserId, "Unique identifier for a back-office user.", "user_id");
id_newtype!(GroupId, "Unique identifier for a user group.", "group_id");
id_newtype!(
    PermissionId,
    "Unique identifier for a permission.",
    "permission_id"
);

non_empty_string_newtype!(CompanyName, "Company legal or trade name.", "company name");
non_empty_string_newtype!(TaxId, "Company tax registration number.", "tax id");
non_empty_string_newtype!(VenueName, "Venue display name.", "venue name");
non_empty_string_newtype!(PartyName, "Client or supplier name.", "party name");
non_empty_string_newtype!(ProjectName, "Project or event name.", "project name");
non_empty_string_newtype!(ContractNumber, "Contract reference number.", "contract number");
non_empty_string_newtype!(TicketTypeName, "Ticket type label.", "ticket type name");
non_empty_string_newtype!(GroupName, "User group name.", "group name");
non_empty_string_newtype!(PersonName, "Name of a person.", "name");
non_empty_string_newtype!(
    Description,
    "Free-form description enforcing non-empty values.",
    "description"
);

counter_newtype!(Capacity, "Number of places or tickets available.", "capacity", 0);
counter_newtype!(Quantity, "Strictly positive number of units.", "quantity", 1);

/// Validated, trimmed, lower-cased email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Trims, lower-cases and validates the address.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "email")?.to_lowercase();
        if !trimmed.as_str().validate_email() {
            return Err(TypeConstraintError::InvalidEmail("email"));
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Monetary amount stored as integer cents.
///
/// Arithmetic never goes through floating point and saturates at the `i64`
/// bounds.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Largest amount accepted from user input: one hundred billion.
    pub const MAX_INPUT_CENTS: i64 = 10_000_000_000_000;

    /// Parses user-entered text into cents.
    ///
    /// Accepts `1234.56`, `1234,56` and `1.234,56`. When both separators
    /// appear the last one is the decimal separator, and every thousands
    /// group after the first must have exactly three digits. At most two
    /// fractional digits are allowed.
    pub fn parse(text: &str, field: &'static str) -> Result<Self, TypeConstraintError> {
        let raw: String = text
            .trim()
            .trim_start_matches("R$")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if raw.is_empty() {
            return Err(TypeConstraintError::EmptyString(field));
        }

        let (negative, raw) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest.to_string()),
            None => (false, raw),
        };

        let decimal_pos = match (raw.rfind(','), raw.rfind('.')) {
            (Some(c), Some(d)) => Some(c.max(d)),
            (Some(c), None) => Some(c),
            (None, Some(d)) => {
                // A lone dot followed by exactly three digits is a thousands separator.
                let fraction = &raw[d + 1..];
                if raw.matches('.').count() > 1 || fraction.len() == 3 {
                    None
                } else {
                    Some(d)
                }
            }
            (None, None) => None,
        };

        let (whole, fraction) = match decimal_pos {
            Some(pos) => (&raw[..pos], &raw[pos + 1..]),
            None => (raw.as_str(), ""),
        };
        if !valid_grouping(whole) {
            return Err(TypeConstraintError::InvalidAmount(field));
        }
        let whole: String = whole.chars().filter(|c| *c != '.' && *c != ',').collect();

        if fraction.len() > 2
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || !whole.chars().all(|c| c.is_ascii_digit())
            || (whole.is_empty() && fraction.is_empty())
        {
            return Err(TypeConstraintError::InvalidAmount(field));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| TypeConstraintError::InvalidAmount(field))?
        };
        let mut fraction_cents: i64 = if fraction.is_empty() {
            0
        } else {
            fraction
                .parse()
                .map_err(|_| TypeConstraintError::InvalidAmount(field))?
        };
        if fraction.len() == 1 {
            fraction_cents *= 10;
        }

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .filter(|c| *c <= Self::MAX_INPUT_CENTS)
            .ok_or(TypeConstraintError::InvalidAmount(field))?;
        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Parses an amount that must be strictly positive.
    pub fn parse_positive(text: &str, field: &'static str) -> Result<Self, TypeConstraintError> {
        let amount = Self::parse(text, field)?;
        if amount.0 > 0 {
            Ok(amount)
        } else {
            Err(TypeConstraintError::NonPositiveNumber(field))
        }
    }

    /// Parses an amount that must be zero or greater.
    pub fn parse_non_negative(
        text: &str,
        field: &'static str,
    ) -> Result<Self, TypeConstraintError> {
        let amount = Self::parse(text, field)?;
        if amount.0 >= 0 {
            Ok(amount)
        } else {
            Err(TypeConstraintError::NegativeNumber(field))
        }
    }

    pub fn checked_mul(self, quantity: i32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Ratio of `self` to `whole`, expressed in percent.
    pub fn ratio_percent(self, whole: Self) -> f64 {
        if whole.0 == 0 {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }
}

/// Thousands groups: the first has one to three digits, the rest exactly three.
fn valid_grouping(whole: &str) -> bool {
    if !whole.contains(['.', ',']) {
        return true;
    }
    let mut groups = whole.split(['.', ',']);
    let first_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()));
    first_ok && groups.all(|g| g.len() == 3)
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

string_enum!(
    /// Whether a party buys from or sells to the business.
    PartyKind, "party kind", {
        Client => "client",
        Supplier => "supplier",
        Both => "both",
    }
);

string_enum!(
    /// Lifecycle of a project/event.
    ProjectStatus, "project status", {
        Planning => "planning",
        Confirmed => "confirmed",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

string_enum!(
    /// Lifecycle of a contract.
    ContractStatus, "contract status", {
        Draft => "draft",
        Active => "active",
        Closed => "closed",
        Cancelled => "cancelled",
    }
);

string_enum!(
    /// Channel through which tickets were sold.
    SalesChannel, "sales channel", {
        BoxOffice => "box_office",
        Online => "online",
        Partner => "partner",
    }
);

string_enum!(
    /// Payment method for sales and settled financial records.
    PaymentMethod, "payment method", {
        Cash => "cash",
        CreditCard => "credit_card",
        DebitCard => "debit_card",
        Pix => "pix",
        BankTransfer => "bank_transfer",
        Boleto => "boleto",
    }
);

string_enum!(
    /// Revenue or expense.
    FinancialKind, "financial kind", {
        Revenue => "revenue",
        Expense => "expense",
    }
);

string_enum!(
    /// Settlement status of a financial record.
    FinancialStatus, "financial status", {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
);

string_enum!(
    /// Category tag of a financial record. Category-specific fields live in
    /// [`crate::domain::finance::FinancialDetails`].
    FinancialCategory, "financial category", {
        TicketSales => "ticket_sales",
        Sponsorship => "sponsorship",
        SupplierPayment => "supplier_payment",
        Payroll => "payroll",
        Tax => "tax",
        Other => "other",
    }
);

string_enum!(
    /// Which financial records count toward a period's totals.
    Regime, "regime", {
        Cash => "cash",
        Accrual => "accrual",
    }
);
