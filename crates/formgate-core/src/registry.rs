//! Named, parameterized tests evaluated against a field's value.
//!
//! A [`TestRegistry`] is an immutable catalog shared by one or more
//! validators. [`TestRegistry::builtin`] carries the standard tests:
//!
//! | name | parameter | passes when |
//! |---|---|---|
//! | `required` | | value filled (choice group: a peer is selected) |
//! | `required-filled` | other name | other empty, or this filled |
//! | `required-filled-id` | other id | other empty, or this filled |
//! | `required-empty` | other name | other filled, or this filled |
//! | `required-empty-id` | other id | other filled, or this filled |
//! | `float` | | numeric literal |
//! | `integer` | | canonical decimal integer |
//! | `bool` | | `"0"` or `"1"` |
//! | `min-value` / `max-value` | bound | value `>=` / `<=` bound |
//! | `length` / `min-length` / `max-length` | count | char count `==` / `>=` / `<=` |
//! | `pattern` | regex | value matches |
//! | `email` | | `local@domain.tld` shape |
//! | `matches` / `greater` / `lower` | other name | `==` / `>` / `<` other value |
//! | `in-array` | `a, b, c` | value is one of the tokens |
//!
//! Every test except `required` passes on an empty value; compose with
//! `required` to make a field mandatory.

use crate::collaborator::{FieldValue, ValueLookup};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Inputs a test is evaluated against.
#[derive(Clone, Copy)]
pub struct TestContext<'a> {
    /// Current value of the field under test.
    pub value: &'a FieldValue,
    /// Parameter configured for this test on the field.
    pub parameter: Option<&'a str>,
    /// Access to other controls' values.
    pub lookup: &'a dyn ValueLookup,
}

impl fmt::Debug for TestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("value", &self.value)
            .field("parameter", &self.parameter)
            .finish_non_exhaustive()
    }
}

impl<'a> TestContext<'a> {
    /// Create a context.
    pub fn new(
        value: &'a FieldValue,
        parameter: Option<&'a str>,
        lookup: &'a dyn ValueLookup,
    ) -> Self {
        Self {
            value,
            parameter,
            lookup,
        }
    }

    /// Value of the control named by the parameter, empty when unresolved.
    ///
    /// A leading `*.` scope marker on the parameter is ignored.
    pub fn other_by_name(&self) -> FieldValue {
        self.parameter
            .map(|p| p.replacen("*.", "", 1))
            .and_then(|name| self.lookup.by_name(&name))
            .unwrap_or_default()
    }

    /// Value of the control whose id is the parameter, empty when unresolved.
    pub fn other_by_id(&self) -> FieldValue {
        self.parameter
            .and_then(|id| self.lookup.by_id(id))
            .unwrap_or_default()
    }
}

/// A named predicate.
pub trait Test: Send + Sync {
    /// Whether the value passes.
    fn check(&self, ctx: &TestContext<'_>) -> bool;

    /// Registry key of this test.
    fn name(&self) -> &str;
}

/// Test backed by a function or closure.
pub struct FnTest<F>
where
    F: Fn(&TestContext<'_>) -> bool + Send + Sync,
{
    name: String,
    predicate: F,
}

impl<F> FnTest<F>
where
    F: Fn(&TestContext<'_>) -> bool + Send + Sync,
{
    /// Create a test.
    pub fn new(name: &str, predicate: F) -> Self {
        Self {
            name: name.to_string(),
            predicate,
        }
    }
}

impl<F> Test for FnTest<F>
where
    F: Fn(&TestContext<'_>) -> bool + Send + Sync,
{
    fn check(&self, ctx: &TestContext<'_>) -> bool {
        (self.predicate)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnTest<F>
where
    F: Fn(&TestContext<'_>) -> bool + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTest").field("name", &self.name).finish()
    }
}

/// Catalog of tests looked up by name.
pub struct TestRegistry {
    tests: Vec<Box<dyn Test>>,
}

impl fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRegistry")
            .field("tests", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TestRegistry {
    /// Registry with no tests.
    pub fn empty() -> Self {
        Self { tests: Vec::new() }
    }

    /// Registry with the standard tests.
    pub fn builtin() -> Self {
        Self::empty()
            .with_fn("required", builtin::required)
            .with_fn("required-filled", builtin::required_filled)
            .with_fn("required-filled-id", builtin::required_filled_id)
            .with_fn("required-empty", builtin::required_empty)
            .with_fn("required-empty-id", builtin::required_empty_id)
            .with_fn("float", builtin::float)
            .with_fn("integer", builtin::integer)
            .with_fn("bool", builtin::boolean)
            .with_fn("min-value", builtin::min_value)
            .with_fn("max-value", builtin::max_value)
            .with_fn("length", builtin::length)
            .with_fn("min-length", builtin::min_length)
            .with_fn("max-length", builtin::max_length)
            .with_fn("pattern", builtin::pattern)
            .with_fn("email", builtin::email)
            .with_fn("matches", builtin::matches)
            .with_fn("greater", builtin::greater)
            .with_fn("lower", builtin::lower)
            .with_fn("in-array", builtin::in_array)
    }

    /// Add a test, replacing any test of the same name.
    pub fn with_test<T: Test + 'static>(mut self, test: T) -> Self {
        self.register(test);
        self
    }

    /// Add a function-backed test, replacing any test of the same name.
    pub fn with_fn<F>(self, name: &str, predicate: F) -> Self
    where
        F: Fn(&TestContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.with_test(FnTest::new(name, predicate))
    }

    /// Add a test in place, replacing any test of the same name.
    pub fn register<T: Test + 'static>(&mut self, test: T) {
        match self.tests.iter().position(|t| t.name() == test.name()) {
            Some(index) => self.tests[index] = Box::new(test),
            None => self.tests.push(Box::new(test)),
        }
    }

    /// Look up a test.
    pub fn get(&self, name: &str) -> Option<&dyn Test> {
        self.tests
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Whether a test is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Evaluate a test; `None` when the name is unknown.
    pub fn evaluate(&self, name: &str, ctx: &TestContext<'_>) -> Option<bool> {
        self.get(name).map(|test| test.check(ctx))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name())
    }

    /// Number of tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether the registry has no tests.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// The standard predicates.
pub mod builtin {
    use super::{compiled_pattern, email_regex, TestContext};

    fn number(s: &str) -> Option<f64> {
        s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn count(parameter: Option<&str>) -> Option<usize> {
        parameter.and_then(|p| p.trim().parse::<usize>().ok())
    }

    fn compare_len(ctx: &TestContext<'_>, cmp: impl Fn(usize, usize) -> bool) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        count(ctx.parameter).is_some_and(|bound| cmp(ctx.value.text.chars().count(), bound))
    }

    fn compare_value(ctx: &TestContext<'_>, cmp: impl Fn(f64, f64) -> bool) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        match (number(&ctx.value.text), ctx.parameter.and_then(number)) {
            (Some(value), Some(bound)) => cmp(value, bound),
            _ => false,
        }
    }

    fn compare_other(ctx: &TestContext<'_>, cmp: impl Fn(&str, &str) -> bool) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        cmp(&ctx.value.text, &ctx.other_by_name().text)
    }

    /// Value is filled in.
    pub fn required(ctx: &TestContext<'_>) -> bool {
        ctx.value.is_filled()
    }

    /// Filled whenever the named control is filled.
    pub fn required_filled(ctx: &TestContext<'_>) -> bool {
        !ctx.other_by_name().is_filled() || ctx.value.is_filled()
    }

    /// Filled whenever the control with the given id is filled.
    pub fn required_filled_id(ctx: &TestContext<'_>) -> bool {
        !ctx.other_by_id().is_filled() || ctx.value.is_filled()
    }

    /// Filled whenever the named control is empty.
    pub fn required_empty(ctx: &TestContext<'_>) -> bool {
        ctx.other_by_name().is_filled() || ctx.value.is_filled()
    }

    /// Filled whenever the control with the given id is empty.
    pub fn required_empty_id(ctx: &TestContext<'_>) -> bool {
        ctx.other_by_id().is_filled() || ctx.value.is_filled()
    }

    /// The value is a finite floating-point literal. Surrounding whitespace
    /// is ignored, as it is by `min-value` / `max-value`.
    pub fn float(ctx: &TestContext<'_>) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        number(&ctx.value.text).is_some()
    }

    /// The value is an integer written in canonical form (no sign, padding
    /// or fraction beyond what the integer itself renders).
    pub fn integer(ctx: &TestContext<'_>) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        let text = &ctx.value.text;
        text.parse::<i64>().is_ok_and(|n| n.to_string() == *text)
    }

    /// The value is `"0"` or `"1"`.
    pub fn boolean(ctx: &TestContext<'_>) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        matches!(ctx.value.text.as_str(), "0" | "1")
    }

    /// Numeric value is at least the parameter.
    pub fn min_value(ctx: &TestContext<'_>) -> bool {
        compare_value(ctx, |value, bound| value >= bound)
    }

    /// Numeric value is at most the parameter.
    pub fn max_value(ctx: &TestContext<'_>) -> bool {
        compare_value(ctx, |value, bound| value <= bound)
    }

    /// Exactly `parameter` characters.
    pub fn length(ctx: &TestContext<'_>) -> bool {
        compare_len(ctx, |len, bound| len == bound)
    }

    /// At least `parameter` characters.
    pub fn min_length(ctx: &TestContext<'_>) -> bool {
        compare_len(ctx, |len, bound| len >= bound)
    }

    /// At most `parameter` characters.
    pub fn max_length(ctx: &TestContext<'_>) -> bool {
        compare_len(ctx, |len, bound| len <= bound)
    }

    /// The value contains a match of the parameter's regular expression.
    pub fn pattern(ctx: &TestContext<'_>) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        let Some(source) = ctx.parameter else {
            return true;
        };
        compiled_pattern(source).is_some_and(|re| re.is_match(&ctx.value.text))
    }

    /// Basic `local@domain.tld` shape.
    pub fn email(ctx: &TestContext<'_>) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        email_regex().is_match(&ctx.value.text)
    }

    /// Equal to the named control's value.
    pub fn matches(ctx: &TestContext<'_>) -> bool {
        compare_other(ctx, |value, other| value == other)
    }

    /// Sorts after the named control's value.
    pub fn greater(ctx: &TestContext<'_>) -> bool {
        compare_other(ctx, |value, other| value > other)
    }

    /// Sorts before the named control's value.
    pub fn lower(ctx: &TestContext<'_>) -> bool {
        compare_other(ctx, |value, other| value < other)
    }

    /// One of the comma-separated tokens in the parameter.
    pub fn in_array(ctx: &TestContext<'_>) -> bool {
        if !ctx.value.is_filled() {
            return true;
        }
        let Some(list) = ctx.parameter else {
            return false;
        };
        list.split(',')
            .enumerate()
            .map(|(i, token)| if i == 0 { token } else { token.trim_start() })
            .any(|token| token == ctx.value.text)
    }
}

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._]+@[a-z0-9.-]+\.[a-z]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

type PatternCache = Mutex<HashMap<String, Option<Regex>>>;

fn pattern_cache() -> &'static PatternCache {
    static PATTERNS: OnceLock<PatternCache> = OnceLock::new();
    PATTERNS.get_or_init(PatternCache::default)
}

/// Compiled `pattern` parameter, `None` when it is not a valid regex.
/// Each source is compiled (and warned about) once per process.
fn compiled_pattern(source: &str) -> Option<Regex> {
    let mut cache = pattern_cache()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(compiled) = cache.get(source) {
        return compiled.clone();
    }
    let compiled = match Regex::new(source) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!(pattern = source, error = %err, "invalid pattern parameter");
            None
        }
    };
    cache.insert(source.to_string(), compiled.clone());
    compiled
}
