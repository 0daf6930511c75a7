//! The fixed domain of valid state codes.

/// The 50 U.S. state postal codes plus `DC`, in alphabetical order.
pub const VALID_STATE_CODES: [&str; 51] = [
  "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA",
  "ID", "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS",
  "MT", "NC", "ND", "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA",
  "RI", "SC", "SD", "TN", "TX", "UT", "VA", "VT", "WA", "WI", "WV", "WY",
];

/// The ordered set of codes accepted by the geography filter.
pub fn get_valid_state_codes() -> &'static [&'static str] { &VALID_STATE_CODES }

/// Exact, case-sensitive membership test.
pub fn is_valid_state_code(code: &str) -> bool {
  VALID_STATE_CODES.binary_search(&code).is_ok()
}
