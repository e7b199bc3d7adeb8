//! Form-style validation of raw create/update payloads.
//!
//! Validation runs in two steps. [`MovieInput::check`] (and its siblings)
//! checks the shape of every field and collects *all* failures into a draft
//! instead of stopping at the first one. The caller then consults the store
//! with the normalised values the draft exposes (is this title taken? does this
//! movie exist?), feeds the answers back into the draft, and calls `finish` to
//! obtain either a record ready to persist or the full set of [`FieldErrors`].
//!
//! Nothing in this module touches a store; the lookups are the caller's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{
  DEFAULT_DESCRIPTION, NewDirector, NewMovie, NewMovieByDirector, NewReview,
};

// ─── Bounds ──────────────────────────────────────────────────────────────────

pub const TITLE_LEN: (usize, usize) = (3, 150);
pub const DIRECTOR_NAME_LEN: (usize, usize) = (2, 150);
pub const REVIEW_TEXT_LEN: (usize, usize) = (3, 150);
pub const DURATION_RANGE: (i64, i64) = (1, 100);
/// Zero stars is accepted; the storage constraint uses the same range.
pub const STARS_RANGE: (i64, i64) = (0, 5);

// ─── FieldErrors ─────────────────────────────────────────────────────────────

/// Mapping from field name to every message raised against it.
///
/// Serialises as a plain JSON object: `{"title": ["..."], "stars": ["..."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self
      .0
      .entry(field.to_owned())
      .or_default()
      .push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Messages raised against `field`; empty if it passed.
  pub fn get(&self, field: &str) -> &[String] {
    self.0.get(field).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, FieldErrors> {
    if !self.is_empty() {
      return Err(self);
    }
    // Every field that recorded no error produced a value.
    value().ok_or(self)
  }
}

impl std::fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{field}: {message}")?;
        first = false;
      }
    }
    Ok(())
  }
}

// ─── Raw field access ────────────────────────────────────────────────────────

/// A payload field as sent by the client. `None` means the key was absent;
/// `Some(Value::Null)` means it was present and explicitly `null`.
pub type RawField = Option<Value>;

fn present<'de, D>(d: D) -> Result<RawField, D::Error>
where
  D: Deserializer<'de>,
{
  Value::deserialize(d).map(Some)
}

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_INTEGER: &str = "A valid integer is required.";

/// Check a required text field, trimming surrounding whitespace.
fn text(
  errors: &mut FieldErrors,
  field: &str,
  raw: &RawField,
  (min, max): (usize, usize),
) -> Option<String> {
  let value = match raw {
    None => {
      errors.add(field, REQUIRED);
      return None;
    }
    Some(Value::Null) => {
      errors.add(field, NOT_NULL);
      return None;
    }
    Some(Value::String(s)) => s.trim().to_owned(),
    Some(Value::Number(n)) => n.to_string(),
    Some(_) => {
      errors.add(field, NOT_STRING);
      return None;
    }
  };

  if value.is_empty() {
    errors.add(field, NOT_BLANK);
    return None;
  }
  let len = value.chars().count();
  if len > max {
    errors.add(
      field,
      format!("Ensure this field has no more than {max} characters."),
    );
    return None;
  }
  if len < min {
    errors.add(field, format!("Ensure this field has at least {min} characters."));
    return None;
  }
  Some(value)
}

/// Interpret a JSON value as an integer: integers, integral floats, and
/// numeric strings such as `"90"` or `"90.0"` are accepted. Magnitudes beyond
/// `i64` saturate, so range checks still name the bound that was crossed.
fn as_integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_u64().map(|_| i64::MAX))
      .or_else(|| n.as_f64().and_then(integral)),
    Value::String(s) => parse_integer(s.trim()),
    _ => None,
  }
}

fn integral(f: f64) -> Option<i64> {
  // `as` saturates at the i64 bounds.
  (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn parse_integer(s: &str) -> Option<i64> {
  let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
  if !frac.chars().all(|c| c == '0') {
    return None;
  }
  let digits = whole.strip_prefix(['-', '+']).unwrap_or(whole);
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  let saturated = if whole.starts_with('-') { i64::MIN } else { i64::MAX };
  Some(whole.parse().unwrap_or(saturated))
}

/// Check a required integer field against an inclusive range.
fn integer(
  errors: &mut FieldErrors,
  field: &str,
  raw: &RawField,
  (min, max): (i64, i64),
) -> Option<i64> {
  let value = match raw {
    None => {
      errors.add(field, REQUIRED);
      return None;
    }
    Some(Value::Null) => {
      errors.add(field, NOT_NULL);
      return None;
    }
    Some(v) => match as_integer(v) {
      Some(n) => n,
      None => {
        errors.add(field, NOT_INTEGER);
        return None;
      }
    },
  };

  if value > max {
    errors.add(
      field,
      format!("Ensure this value is less than or equal to {max}."),
    );
    return None;
  }
  if value < min {
    errors.add(
      field,
      format!("Ensure this value is greater than or equal to {min}."),
    );
    return None;
  }
  Some(value)
}

fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "str",
    Value::Array(_) => "list",
    Value::Object(_) => "dict",
  }
}

fn missing_pk(pk: impl std::fmt::Display) -> String {
  format!("Invalid pk \"{pk}\" - object does not exist.")
}

// ─── Movie ───────────────────────────────────────────────────────────────────

/// Raw body of `POST /movies` and `PUT /movies/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieInput {
  #[serde(default, deserialize_with = "present")]
  pub title:       RawField,
  /// Optional; absent or `null` falls back to [`DEFAULT_DESCRIPTION`].
  #[serde(default, deserialize_with = "present")]
  pub description: RawField,
  #[serde(default, deserialize_with = "present")]
  pub duration:    RawField,
  /// The director's name; resolved to a record by the caller.
  #[serde(default, deserialize_with = "present")]
  pub director:    RawField,
}

/// A movie payload whose fields have been shape-checked.
#[derive(Debug, Clone)]
pub struct MovieDraft {
  title:       Option<String>,
  description: Option<String>,
  duration:    Option<u32>,
  director:    Option<String>,
  errors:      FieldErrors,
}

/// A fully validated movie payload. The director is still a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMovie {
  pub title:       String,
  pub description: String,
  pub duration:    u32,
  pub director:    String,
}

impl ValidMovie {
  pub fn into_new_movie(self, director_id: Uuid) -> NewMovie {
    NewMovie {
      title: self.title,
      description: self.description,
      duration: self.duration,
      director_id,
    }
  }

  /// Hand the director over by name, for stores to resolve on insert.
  pub fn into_new_movie_by_director(self) -> NewMovieByDirector {
    NewMovieByDirector {
      title:       self.title,
      description: self.description,
      duration:    self.duration,
      director:    self.director,
    }
  }
}

impl MovieInput {
  pub fn check(&self) -> MovieDraft {
    let mut errors = FieldErrors::new();

    let title = text(&mut errors, "title", &self.title, TITLE_LEN);
    let description = match &self.description {
      None | Some(Value::Null) => Some(DEFAULT_DESCRIPTION.to_owned()),
      raw => text(&mut errors, "description", raw, (1, usize::MAX)),
    };
    let duration = integer(&mut errors, "duration", &self.duration, DURATION_RANGE)
      .and_then(|d| u32::try_from(d).ok());
    let director =
      text(&mut errors, "director", &self.director, DIRECTOR_NAME_LEN);

    MovieDraft { title, description, duration, director, errors }
  }
}

impl MovieDraft {
  /// The normalised title, if it passed its shape checks.
  pub fn title(&self) -> Option<&str> { self.title.as_deref() }

  /// The normalised director name, if it passed its shape checks.
  pub fn director(&self) -> Option<&str> { self.director.as_deref() }

  /// Record a uniqueness failure if `holder` (the movie currently using this
  /// title) is some record other than `exclude`.
  pub fn check_title_unique(&mut self, holder: Option<Uuid>, exclude: Option<Uuid>) {
    if taken(holder, exclude) {
      self.errors.add("title", "Movie title already exists");
    }
  }

  /// Record a failure if the named director does not exist. Used on update,
  /// where directors are never created implicitly.
  pub fn check_director_exists(&mut self, exists: bool) {
    if let Some(name) = &self.director
      && !exists
    {
      self
        .errors
        .add("director", format!("Director \"{name}\" does not exist."));
    }
  }

  pub fn finish(self) -> Result<ValidMovie, FieldErrors> {
    let Self { title, description, duration, director, errors } = self;
    errors.into_result(|| {
      Some(ValidMovie {
        title:       title?,
        description: description?,
        duration:    duration?,
        director:    director?,
      })
    })
  }
}

// ─── Director ────────────────────────────────────────────────────────────────

/// Raw body of `POST /directors` and `PUT /directors/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorInput {
  #[serde(default, deserialize_with = "present")]
  pub name: RawField,
}

#[derive(Debug, Clone)]
pub struct DirectorDraft {
  name:   Option<String>,
  errors: FieldErrors,
}

impl DirectorInput {
  pub fn check(&self) -> DirectorDraft {
    let mut errors = FieldErrors::new();
    let name = text(&mut errors, "name", &self.name, DIRECTOR_NAME_LEN);
    DirectorDraft { name, errors }
  }
}

impl DirectorDraft {
  pub fn name(&self) -> Option<&str> { self.name.as_deref() }

  pub fn check_name_unique(&mut self, holder: Option<Uuid>, exclude: Option<Uuid>) {
    if taken(holder, exclude) {
      self.errors.add("name", "Director name already exists");
    }
  }

  pub fn finish(self) -> Result<NewDirector, FieldErrors> {
    let Self { name, errors } = self;
    errors.into_result(|| Some(NewDirector { name: name? }))
  }
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// Raw body of `POST /reviews` and `PUT /reviews/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
  #[serde(default, deserialize_with = "present")]
  pub text:  RawField,
  /// The reviewed movie's id.
  #[serde(default, deserialize_with = "present")]
  pub movie: RawField,
  #[serde(default, deserialize_with = "present")]
  pub stars: RawField,
}

#[derive(Debug, Clone)]
pub struct ReviewDraft {
  text:     Option<String>,
  movie_id: Option<Uuid>,
  stars:    Option<u8>,
  errors:   FieldErrors,
}

impl ReviewInput {
  pub fn check(&self) -> ReviewDraft {
    let mut errors = FieldErrors::new();

    let text = text(&mut errors, "text", &self.text, REVIEW_TEXT_LEN);
    let movie_id = match &self.movie {
      None => {
        errors.add("movie", REQUIRED);
        None
      }
      Some(Value::Null) => {
        errors.add("movie", NOT_NULL);
        None
      }
      Some(Value::String(s)) => match Uuid::parse_str(s.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
          errors.add("movie", missing_pk(s));
          None
        }
      },
      Some(other) => {
        errors.add(
          "movie",
          format!(
            "Incorrect type. Expected pk value, received {}.",
            json_type_name(other)
          ),
        );
        None
      }
    };
    let stars = integer(&mut errors, "stars", &self.stars, STARS_RANGE)
      .and_then(|s| u8::try_from(s).ok());

    ReviewDraft { text, movie_id, stars, errors }
  }
}

impl ReviewDraft {
  /// The referenced movie id, if it parsed.
  pub fn movie_id(&self) -> Option<Uuid> { self.movie_id }

  /// Record a failure if the referenced movie does not exist.
  pub fn check_movie_exists(&mut self, exists: bool) {
    if let Some(id) = self.movie_id
      && !exists
    {
      self.errors.add("movie", missing_pk(id));
    }
  }

  pub fn finish(self) -> Result<NewReview, FieldErrors> {
    let Self { text, movie_id, stars, errors } = self;
    errors.into_result(|| {
      Some(NewReview {
        movie_id: movie_id?,
        text:     text?,
        stars:    stars?,
      })
    })
  }
}

fn taken(holder: Option<Uuid>, exclude: Option<Uuid>) -> bool {
  matches!(holder, Some(id) if Some(id) != exclude)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn movie_input(body: Value) -> MovieInput {
    serde_json::from_value(body).expect("movie input")
  }

  fn review_input(body: Value) -> ReviewInput {
    serde_json::from_value(body).expect("review input")
  }

  // ── Movies ──────────────────────────────────────────────────────────────

  #[test]
  fn valid_movie_is_normalised() {
    let input = movie_input(json!({
      "title": "  Stalker ",
      "duration": "100",
      "director": "Andrei Tarkovsky",
    }));
    let movie = input.check().finish().unwrap();
    assert_eq!(movie.title, "Stalker");
    assert_eq!(movie.description, DEFAULT_DESCRIPTION);
    assert_eq!(movie.duration, 100);
    assert_eq!(movie.director, "Andrei Tarkovsky");
  }

  #[test]
  fn null_description_falls_back_to_default() {
    let input = movie_input(json!({
      "title": "Solaris",
      "description": null,
      "duration": 99,
      "director": "Andrei Tarkovsky",
    }));
    let movie = input.check().finish().unwrap();
    assert_eq!(movie.description, DEFAULT_DESCRIPTION);
  }

  #[test]
  fn every_failing_field_is_reported() {
    let input = movie_input(json!({
      "title": "ab",
      "duration": 0,
      "director": "",
    }));
    let errors = input.check().finish().unwrap_err();
    assert_eq!(
      errors.get("title"),
      ["Ensure this field has at least 3 characters."]
    );
    assert_eq!(
      errors.get("duration"),
      ["Ensure this value is greater than or equal to 1."]
    );
    assert_eq!(errors.get("director"), ["This field may not be blank."]);
    assert!(errors.get("description").is_empty());
  }

  #[test]
  fn missing_fields_are_required() {
    let errors = movie_input(json!({})).check().finish().unwrap_err();
    let fields: Vec<_> = errors.fields().collect();
    assert_eq!(fields, ["director", "duration", "title"]);
    assert_eq!(errors.get("title"), [REQUIRED]);
  }

  #[test]
  fn duration_rejects_fractions_and_accepts_integral_floats() {
    let mut body = json!({ "title": "Heat", "director": "Michael Mann" });

    body["duration"] = json!(90.5);
    let errors = movie_input(body.clone()).check().finish().unwrap_err();
    assert_eq!(errors.get("duration"), [NOT_INTEGER]);

    body["duration"] = json!(90.0);
    assert_eq!(movie_input(body.clone()).check().finish().unwrap().duration, 90);

    body["duration"] = json!(101);
    let errors = movie_input(body).check().finish().unwrap_err();
    assert_eq!(
      errors.get("duration"),
      ["Ensure this value is less than or equal to 100."]
    );
  }

  #[test]
  fn oversized_duration_reports_the_range() {
    let mut body = json!({ "title": "Heat", "director": "Michael Mann" });
    let too_long = ["Ensure this value is less than or equal to 100."];

    body["duration"] = json!(u64::MAX);
    let errors = movie_input(body.clone()).check().finish().unwrap_err();
    assert_eq!(errors.get("duration"), too_long);

    body["duration"] = json!(1e20);
    let errors = movie_input(body.clone()).check().finish().unwrap_err();
    assert_eq!(errors.get("duration"), too_long);

    body["duration"] = json!("99999999999999999999");
    let errors = movie_input(body.clone()).check().finish().unwrap_err();
    assert_eq!(errors.get("duration"), too_long);

    body["duration"] = json!("-99999999999999999999");
    let errors = movie_input(body).check().finish().unwrap_err();
    assert_eq!(
      errors.get("duration"),
      ["Ensure this value is greater than or equal to 1."]
    );
  }

  #[test]
  fn long_title_is_rejected() {
    let input = movie_input(json!({
      "title": "x".repeat(151),
      "duration": 10,
      "director": "Someone",
    }));
    let errors = input.check().finish().unwrap_err();
    assert_eq!(
      errors.get("title"),
      ["Ensure this field has no more than 150 characters."]
    );
  }

  #[test]
  fn title_taken_by_another_movie_fails() {
    let input = movie_input(json!({
      "title": "Alien",
      "duration": 100,
      "director": "Ridley Scott",
    }));
    let mut draft = input.check();
    draft.check_title_unique(Some(Uuid::new_v4()), None);
    let errors = draft.finish().unwrap_err();
    assert_eq!(errors.get("title"), ["Movie title already exists"]);
  }

  #[test]
  fn title_held_by_self_passes() {
    let own_id = Uuid::new_v4();
    let input = movie_input(json!({
      "title": "Alien",
      "duration": 100,
      "director": "Ridley Scott",
    }));
    let mut draft = input.check();
    draft.check_title_unique(Some(own_id), Some(own_id));
    assert!(draft.finish().is_ok());
  }

  #[test]
  fn unknown_director_fails_when_required_to_exist() {
    let input = movie_input(json!({
      "title": "Alien",
      "duration": 100,
      "director": "Nobody",
    }));
    let mut draft = input.check();
    draft.check_director_exists(false);
    let errors = draft.finish().unwrap_err();
    assert_eq!(errors.get("director"), ["Director \"Nobody\" does not exist."]);
  }

  // ── Directors ───────────────────────────────────────────────────────────

  #[test]
  fn director_name_bounds_and_uniqueness() {
    let input: DirectorInput = serde_json::from_value(json!({ "name": "X" })).unwrap();
    let errors = input.check().finish().unwrap_err();
    assert_eq!(
      errors.get("name"),
      ["Ensure this field has at least 2 characters."]
    );

    let input: DirectorInput =
      serde_json::from_value(json!({ "name": "Agnès Varda" })).unwrap();
    let mut draft = input.check();
    assert_eq!(draft.name(), Some("Agnès Varda"));
    draft.check_name_unique(Some(Uuid::new_v4()), None);
    let errors = draft.finish().unwrap_err();
    assert_eq!(errors.get("name"), ["Director name already exists"]);
  }

  #[test]
  fn director_rename_onto_another_name_fails() {
    let (own_id, other_id) = (Uuid::new_v4(), Uuid::new_v4());
    let input: DirectorInput =
      serde_json::from_value(json!({ "name": "Claire Denis" })).unwrap();

    let mut draft = input.check();
    draft.check_name_unique(Some(other_id), Some(own_id));
    let errors = draft.finish().unwrap_err();
    assert_eq!(errors.get("name"), ["Director name already exists"]);

    let mut draft = input.check();
    draft.check_name_unique(Some(own_id), Some(own_id));
    assert!(draft.finish().is_ok());
  }

  #[test]
  fn director_name_rejects_non_strings() {
    let input: DirectorInput =
      serde_json::from_value(json!({ "name": ["a", "b"] })).unwrap();
    let errors = input.check().finish().unwrap_err();
    assert_eq!(errors.get("name"), [NOT_STRING]);
  }

  // ── Reviews ─────────────────────────────────────────────────────────────

  #[test]
  fn six_stars_is_rejected() {
    let input = review_input(json!({
      "text": "Loved it",
      "movie": Uuid::new_v4().to_string(),
      "stars": 6,
    }));
    let errors = input.check().finish().unwrap_err();
    assert_eq!(
      errors.get("stars"),
      ["Ensure this value is less than or equal to 5."]
    );
  }

  #[test]
  fn zero_stars_is_accepted() {
    let movie_id = Uuid::new_v4();
    let input = review_input(json!({
      "text": "Walked out",
      "movie": movie_id.to_string(),
      "stars": 0,
    }));
    let mut draft = input.check();
    draft.check_movie_exists(true);
    let review = draft.finish().unwrap();
    assert_eq!(review.stars, 0);
    assert_eq!(review.movie_id, movie_id);
  }

  #[test]
  fn negative_stars_is_rejected() {
    let input = review_input(json!({
      "text": "Awful",
      "movie": Uuid::new_v4().to_string(),
      "stars": -1,
    }));
    let errors = input.check().finish().unwrap_err();
    assert_eq!(
      errors.get("stars"),
      ["Ensure this value is greater than or equal to 0."]
    );
  }

  #[test]
  fn review_movie_reference_errors() {
    let errors = review_input(json!({ "text": "ok?", "movie": 7, "stars": 3 }))
      .check()
      .finish()
      .unwrap_err();
    assert_eq!(
      errors.get("movie"),
      ["Incorrect type. Expected pk value, received number."]
    );

    let errors = review_input(json!({ "text": "ok?", "movie": "nope", "stars": 3 }))
      .check()
      .finish()
      .unwrap_err();
    assert_eq!(errors.get("movie"), ["Invalid pk \"nope\" - object does not exist."]);

    let missing = Uuid::new_v4();
    let mut draft =
      review_input(json!({ "text": "ok?", "movie": missing.to_string(), "stars": 3 }))
        .check();
    draft.check_movie_exists(false);
    let errors = draft.finish().unwrap_err();
    assert_eq!(
      errors.get("movie"),
      [format!("Invalid pk \"{missing}\" - object does not exist.")]
    );
  }

  #[test]
  fn field_errors_serialise_as_object() {
    let mut errors = FieldErrors::new();
    errors.add("text", "one");
    errors.add("text", "two");
    assert_eq!(
      serde_json::to_value(&errors).unwrap(),
      json!({ "text": ["one", "two"] })
    );
    assert_eq!(errors.to_string(), "text: one; text: two");
  }
}
