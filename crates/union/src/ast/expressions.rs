//! SQL expressions and operators

use crate::types::{DataType, SlotId};
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};

/// SQL expressions, e.g. `a + 7 > b`. Can be nested.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expression {
    /// A column reference, optionally qualified with a table name.
    /// Only present before the select analyzer resolves it.
    Column(Option<String>, String),
    /// A resolved reference to a slot of a tuple.
    SlotRef(SlotRef),
    /// A literal value.
    Literal(Literal),
    /// A cast to the given type. Implicit casts are inserted by analysis
    /// and render as their child.
    Cast {
        expr: Box<Expression>,
        to: DataType,
        implicit: bool,
    },
    /// A function call (name and parameters).
    Function(String, Vec<Expression>),
    /// An operator.
    Operator(Operator),
}

/// A resolved slot reference
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SlotRef {
    pub slot: SlotId,
    /// Label used when rendering the reference back to SQL
    pub label: String,
}

/// Expression literal values.
#[derive(Clone, Debug)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i128),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    Timestamp(chrono::NaiveDateTime),
}

/// Expression operators.
///
/// Since this is a recursive data structure, we have to box each child
/// expression, which incurs a heap allocation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    And(Box<Expression>, Box<Expression>), // a AND b
    Not(Box<Expression>),                  // NOT a
    Or(Box<Expression>, Box<Expression>),  // a OR b

    Equal(Box<Expression>, Box<Expression>),       // a = b
    GreaterThan(Box<Expression>, Box<Expression>), // a > b
    GreaterThanOrEqual(Box<Expression>, Box<Expression>), // a >= b
    IsNull(Box<Expression>),                       // a IS NULL
    LessThan(Box<Expression>, Box<Expression>),    // a < b
    LessThanOrEqual(Box<Expression>, Box<Expression>), // a <= b
    NotEqual(Box<Expression>, Box<Expression>),    // a != b

    Add(Box<Expression>, Box<Expression>),       // a + b
    Divide(Box<Expression>, Box<Expression>),    // a / b
    Multiply(Box<Expression>, Box<Expression>),  // a * b
    Negate(Box<Expression>),                     // -a
    Remainder(Box<Expression>, Box<Expression>), // a % b
    Subtract(Box<Expression>, Box<Expression>),  // a - b

    Like(Box<Expression>, Box<Expression>), // a LIKE b
}

/// To allow using expressions and literals in e.g. hashmaps, implement simple
/// equality by value for all types, including Null and f64::NAN. This only
/// checks that the values are the same, and ignores SQL semantics for e.g. NULL
/// and NaN.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Integer(l), Self::Integer(r)) => l == r,
            (Self::Float(l), Self::Float(r)) => l.to_bits() == r.to_bits(),
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::String(l), Self::String(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (_, _) => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(v) => v.hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Decimal(v) => v.hash(state),
            Self::String(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::Time(v) => v.hash(state),
            Self::Timestamp(v) => v.hash(state),
        }
    }
}

impl Literal {
    /// The type a literal has on its own, before any implicit cast. Integer
    /// literals take the narrowest type that holds them.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean(_) => DataType::Bool,
            Self::Integer(v) => {
                if i8::try_from(*v).is_ok() {
                    DataType::I8
                } else if i16::try_from(*v).is_ok() {
                    DataType::I16
                } else if i32::try_from(*v).is_ok() {
                    DataType::I32
                } else if i64::try_from(*v).is_ok() {
                    DataType::I64
                } else {
                    DataType::I128
                }
            }
            Self::Float(_) => DataType::F64,
            Self::Decimal(d) => {
                let digits = d.mantissa().unsigned_abs().to_string().len() as u32;
                let scale = d.scale();
                DataType::Decimal(Some(digits.max(scale).max(1)), Some(scale))
            }
            Self::String(_) => DataType::Str,
            Self::Date(_) => DataType::Date,
            Self::Time(_) => DataType::Time,
            Self::Timestamp(_) => DataType::Timestamp,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "TIME '{}'", t.format("%H:%M:%S%.f")),
            Self::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl From<Operator> for Expression {
    fn from(operator: Operator) -> Self {
        Expression::Operator(operator)
    }
}

impl From<SlotRef> for Expression {
    fn from(slot_ref: SlotRef) -> Self {
        Expression::SlotRef(slot_ref)
    }
}

impl Expression {
    /// Walks the expression tree depth-first, calling a closure for every node.
    /// Halts and returns false if the closure returns false.
    pub fn walk(&self, visitor: &mut impl FnMut(&Expression) -> bool) -> bool {
        use Operator::*;

        if !visitor(self) {
            return false;
        }

        match self {
            Self::Operator(op) => match op {
                Add(lhs, rhs)
                | And(lhs, rhs)
                | Divide(lhs, rhs)
                | Equal(lhs, rhs)
                | GreaterThan(lhs, rhs)
                | GreaterThanOrEqual(lhs, rhs)
                | LessThan(lhs, rhs)
                | LessThanOrEqual(lhs, rhs)
                | Like(lhs, rhs)
                | Multiply(lhs, rhs)
                | NotEqual(lhs, rhs)
                | Or(lhs, rhs)
                | Remainder(lhs, rhs)
                | Subtract(lhs, rhs) => lhs.walk(visitor) && rhs.walk(visitor),

                IsNull(expr) | Negate(expr) | Not(expr) => expr.walk(visitor),
            },

            Self::Function(_, exprs) => exprs.iter().all(|expr| expr.walk(visitor)),

            Self::Cast { expr, .. } => expr.walk(visitor),

            Self::Column(_, _) | Self::SlotRef(_) | Self::Literal(_) => true,
        }
    }

    /// Transforms the expression tree depth-first, by applying a closure to every
    /// node and replacing the current node with the returned value.
    pub fn transform<E>(
        &mut self,
        transformer: &mut impl FnMut(&mut Expression) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        use Operator::*;

        // Transform children first.
        match self {
            Self::Operator(op) => match op {
                Add(lhs, rhs)
                | And(lhs, rhs)
                | Divide(lhs, rhs)
                | Equal(lhs, rhs)
                | GreaterThan(lhs, rhs)
                | GreaterThanOrEqual(lhs, rhs)
                | LessThan(lhs, rhs)
                | LessThanOrEqual(lhs, rhs)
                | Like(lhs, rhs)
                | Multiply(lhs, rhs)
                | NotEqual(lhs, rhs)
                | Or(lhs, rhs)
                | Remainder(lhs, rhs)
                | Subtract(lhs, rhs) => {
                    lhs.transform(transformer)?;
                    rhs.transform(transformer)?;
                }

                IsNull(expr) | Negate(expr) | Not(expr) => expr.transform(transformer)?,
            },

            Self::Function(_, exprs) => {
                for expr in exprs {
                    expr.transform(transformer)?;
                }
            }

            Self::Cast { expr, .. } => expr.transform(transformer)?,

            Self::Column(_, _) | Self::SlotRef(_) | Self::Literal(_) => {}
        }

        // Transform the current node.
        transformer(self)
    }

    /// Returns whether the expression is a constant, without any column references.
    pub fn is_constant(&self) -> bool {
        self.walk(&mut |expr| !matches!(expr, Self::Column(_, _) | Self::SlotRef(_)))
    }

    /// Slot ids referenced anywhere in the expression, in visit order.
    pub fn slot_ids(&self) -> Vec<SlotId> {
        let mut slots = Vec::new();
        self.walk(&mut |expr| {
            if let Self::SlotRef(slot_ref) = expr {
                slots.push(slot_ref.slot);
            }
            true
        });
        slots
    }

    /// The slot reference this expression is, looking through implicit casts
    /// only. Computed expressions and explicit casts return None.
    pub fn unwrap_slot_ref(&self) -> Option<&SlotRef> {
        match self {
            Self::SlotRef(slot_ref) => Some(slot_ref),
            Self::Cast {
                expr,
                implicit: true,
                ..
            } => expr.unwrap_slot_ref(),
            _ => None,
        }
    }

    /// Default output label: the column name for column references, the
    /// rendered SQL otherwise.
    pub fn label(&self) -> String {
        match self {
            Self::Column(_, name) => name.clone(),
            Self::SlotRef(slot_ref) => slot_ref.label.clone(),
            Self::Cast {
                expr,
                implicit: true,
                ..
            } => expr.label(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;
        match self {
            Self::Column(Some(table), name) => write!(f, "{}.{}", table, name),
            Self::Column(None, name) => write!(f, "{}", name),
            Self::SlotRef(slot_ref) => write!(f, "{}", slot_ref.label),
            Self::Literal(literal) => write!(f, "{}", literal),

            Self::Cast {
                expr,
                implicit: true,
                ..
            } => write!(f, "{}", expr),
            Self::Cast { expr, to, .. } => write!(f, "CAST({} AS {})", expr, to),

            Self::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }

            Self::Operator(op) => match op {
                And(lhs, rhs) => write!(f, "({} AND {})", lhs, rhs),
                Or(lhs, rhs) => write!(f, "({} OR {})", lhs, rhs),
                Not(expr) => write!(f, "(NOT {})", expr),

                Equal(lhs, rhs) => write!(f, "({} = {})", lhs, rhs),
                NotEqual(lhs, rhs) => write!(f, "({} != {})", lhs, rhs),
                GreaterThan(lhs, rhs) => write!(f, "({} > {})", lhs, rhs),
                GreaterThanOrEqual(lhs, rhs) => write!(f, "({} >= {})", lhs, rhs),
                LessThan(lhs, rhs) => write!(f, "({} < {})", lhs, rhs),
                LessThanOrEqual(lhs, rhs) => write!(f, "({} <= {})", lhs, rhs),
                IsNull(expr) => write!(f, "({} IS NULL)", expr),

                Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
                Subtract(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
                Multiply(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
                Divide(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
                Remainder(lhs, rhs) => write!(f, "({} % {})", lhs, rhs),
                Negate(expr) => write!(f, "(-{})", expr),

                Like(lhs, rhs) => write!(f, "({} LIKE {})", lhs, rhs),
            },
        }
    }
}

/// An analyzed result expression together with its resolved type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedExpr {
    pub expr: Expression,
    pub data_type: DataType,
}

impl TypedExpr {
    pub fn new(expr: impl Into<Expression>, data_type: DataType) -> Self {
        Self {
            expr: expr.into(),
            data_type,
        }
    }

    /// A typed slot reference
    pub fn slot_ref(slot: SlotId, label: impl Into<String>, data_type: DataType) -> Self {
        Self::new(
            SlotRef {
                slot,
                label: label.into(),
            },
            data_type,
        )
    }

    /// Wrap this expression in an implicit cast to the given type.
    pub fn cast_to(&self, to: DataType) -> Self {
        Self {
            expr: Expression::Cast {
                expr: Box::new(self.expr.clone()),
                to: to.clone(),
                implicit: true,
            },
            data_type: to,
        }
    }

    /// See [`Expression::unwrap_slot_ref`].
    pub fn unwrap_slot_ref(&self) -> Option<&SlotRef> {
        self.expr.unwrap_slot_ref()
    }
}

impl fmt::Display for TypedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
