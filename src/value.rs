use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeZone, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on chained [`Value::Lazy`] hops before resolution gives up.
const MAX_RESOLVE_HOPS: usize = 100;

/// Deferred value, evaluated once per render when the attribute is resolved.
///
/// Any `Fn() -> Value` closure is a `LogValuer`.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// Value carried by an [`Attr`].
#[derive(Clone, Default)]
pub enum Value {
    /// No value. An attribute with an empty key and this value is dropped.
    #[default]
    Empty,
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Time(DateTime<FixedOffset>),
    Duration(Duration),
    /// Ordered members, rendered under the owning attribute's key.
    Group(Vec<Attr>),
    /// Opaque payload rendered through its `Display` implementation.
    Any(Arc<dyn fmt::Display + Send + Sync>),
    Lazy(Arc<dyn LogValuer>),
}

impl Value {
    /// Follow [`Value::Lazy`] chains until a concrete value is produced.
    ///
    /// Chains longer than a fixed bound stop with a string value describing
    /// the overflow instead of looping forever.
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_RESOLVE_HOPS {
            match value {
                Value::Lazy(valuer) => value = valuer.log_value(),
                other => return other,
            }
        }
        if let Value::Lazy(_) = value {
            tracing::warn!(hops = MAX_RESOLVE_HOPS, "lazy log value did not settle");
            return Value::String(format!(
                "!LAZY: log value still unresolved after {} hops",
                MAX_RESOLVE_HOPS
            ));
        }
        value
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }

    /// Time in the canonical attribute form, e.g. `2024-01-02T03:04:05.5Z`:
    /// RFC 3339 with nanoseconds, trailing zeros dropped.
    pub(crate) fn format_time(t: &DateTime<FixedOffset>) -> String {
        let s = if t.offset().local_minus_utc() == 0 {
            t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Nanos, true)
        } else {
            t.to_rfc3339_opts(SecondsFormat::Nanos, false)
        };
        trim_fraction(s)
    }
}

fn trim_fraction(mut s: String) -> String {
    let Some(dot) = s.rfind('.') else {
        return s;
    };
    let digits = s[dot + 1..].bytes().take_while(u8::is_ascii_digit).count();
    let kept = s[dot + 1..dot + 1 + digits].trim_end_matches('0').len();
    let cut = if kept == 0 { dot } else { dot + 1 + kept };
    s.replace_range(cut..dot + 1 + digits, "");
    s
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Time(t) => f.write_str(&Value::format_time(t)),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, a) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", a.key, a.value)?;
                }
                f.write_str("]")
            }
            Value::Any(v) => fmt::Display::fmt(v, f),
            Value::Lazy(_) => fmt::Display::fmt(&self.clone().resolve(), f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("Empty"),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Time(t) => f.debug_tuple("Time").field(t).finish(),
            Value::Duration(d) => f.debug_tuple("Duration").field(d).finish(),
            Value::Group(attrs) => f.debug_tuple("Group").field(attrs).finish(),
            Value::Any(v) => f.debug_tuple("Any").field(&v.to_string()).finish(),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

macro_rules! value_from_int {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

value_from_int!(I64 as i64: i8, i16, i32, i64, isize);
value_from_int!(U64 as u64: u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F64(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::Time(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v.fixed_offset())
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::Time(v.fixed_offset())
    }
}

impl From<Vec<Attr>> for Value {
    fn from(v: Vec<Attr>) -> Self {
        Value::Group(v)
    }
}

/// Key/value pair attached to a record or a derived handler.
#[derive(Clone, Debug, Default)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The attribute that is always dropped: no key, no value.
    pub fn empty() -> Self {
        Attr::default()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && matches!(self.value, Value::Empty)
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attr::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Attr::new(key, Value::I64(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Attr::new(key, Value::U64(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Attr::new(key, Value::F64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Attr::new(key, Value::Bool(value))
    }

    pub fn time<Tz: TimeZone>(key: impl Into<String>, value: DateTime<Tz>) -> Self {
        Attr::new(key, Value::Time(value.fixed_offset()))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Attr::new(key, Value::Duration(value))
    }

    /// Group the given attributes under `key`. An empty key splices the
    /// members into the enclosing level.
    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Attr::new(key, Value::Group(attrs))
    }

    pub fn any<T>(key: impl Into<String>, value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Attr::new(key, Value::Any(Arc::new(value)))
    }

    pub fn lazy<V>(key: impl Into<String>, valuer: V) -> Self
    where
        V: LogValuer + 'static,
    {
        Attr::new(key, Value::Lazy(Arc::new(valuer)))
    }
}
