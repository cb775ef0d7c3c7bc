//! Units of work and the metadata they declare about themselves.
//!
//! A unit of work ("bizlogic") is any `'static` type implementing [`Bizlogic`].
//! The framework never instantiates units while planning, it only reads what
//! each type declares through [`Bizlogic::declare`]:
//!
//! * a single prerequisite unit that must run first,
//! * the data items the unit requires to be injected,
//! * for data-producing units, the data item the unit emits,
//! * for interception wrappers, the declared unit they stand in for.

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A unit of work which can take part in a [`Flow`](crate::Flow).
///
/// Everything the planner needs is declared statically, the default
/// implementation declares nothing.
///
/// ```rust
/// use bizflow::{Bizlogic, Declarations};
///
/// struct FetchCart;
/// struct Cart;
///
/// impl Bizlogic for FetchCart {
///     fn declare(decl: &mut Declarations) {
///         decl.emits::<Cart>();
///     }
/// }
///
/// struct PriceCart;
///
/// impl Bizlogic for PriceCart {
///     fn declare(decl: &mut Declarations) {
///         decl.inject::<Cart>();
///     }
/// }
/// ```
pub trait Bizlogic: 'static {
    fn declare(_decl: &mut Declarations) {}
}

/// Identity of a data type, compared by [`TypeId`] and displayed by its
/// fully qualified name.
#[derive(Clone, Copy)]
pub struct DataType {
    id: TypeId,
    name: &'static str,
}

impl DataType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataType {}

impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({})", self.name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a data item: a name (empty when anonymous) and a type. Each
/// key is produced by exactly one data-producing unit in a flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataKey {
    name: Cow<'static, str>,
    data_type: DataType,
}

impl DataKey {
    pub fn new(name: impl Into<Cow<'static, str>>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Anonymous key for data of type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new("", DataType::of::<T>())
    }

    pub fn named<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, DataType::of::<T>())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.data_type)
        } else {
            write!(f, "{}: {}", self.name, self.data_type)
        }
    }
}

/// The data item a producing unit emits.
#[derive(Debug, Clone)]
pub struct Emission {
    name: Option<Cow<'static, str>>,
    data_type: DataType,
}

impl Emission {
    /// Explicitly declared name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// What a unit type declares about itself, filled in by [`Bizlogic::declare`].
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    prerequisite: Option<UnitType>,
    required: Vec<DataKey>,
    emission: Option<Emission>,
    wrapped: Option<UnitType>,
}

impl Declarations {
    /// Declares the unit `T` has to run before this one. A unit has at most
    /// one declared prerequisite, calling this again replaces it.
    pub fn depends_on<T: Bizlogic>(&mut self) -> &mut Self {
        self.prerequisite = Some(UnitType::of::<T>());
        self
    }

    /// Requires the anonymous data item of type `T`.
    pub fn inject<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.require(DataKey::of::<T>())
    }

    /// Requires the data item of type `T` emitted under `name`.
    pub fn inject_named<T: ?Sized + 'static>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
    ) -> &mut Self {
        self.require(DataKey::named::<T>(name))
    }

    /// Marks the unit as a data adapter producing an anonymous `T`.
    pub fn emits<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.emission = Some(Emission {
            name: None,
            data_type: DataType::of::<T>(),
        });
        self
    }

    /// Marks the unit as a data adapter producing `T` under `name`.
    pub fn emits_named<T: ?Sized + 'static>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
    ) -> &mut Self {
        self.emission = Some(Emission {
            name: Some(name.into()),
            data_type: DataType::of::<T>(),
        });
        self
    }

    /// Marks the unit as a synthetic interception wrapper around `T`. All
    /// other declarations of a wrapper are ignored in favour of the ones
    /// declared by `T`.
    pub fn intercepts<T: Bizlogic>(&mut self) -> &mut Self {
        self.wrapped = Some(UnitType::of::<T>());
        self
    }

    pub fn prerequisite(&self) -> Option<UnitType> {
        self.prerequisite
    }

    pub fn required_data(&self) -> &[DataKey] {
        &self.required
    }

    pub fn emission(&self) -> Option<&Emission> {
        self.emission.as_ref()
    }

    pub fn wrapped(&self) -> Option<UnitType> {
        self.wrapped
    }

    fn require(&mut self, key: DataKey) -> &mut Self {
        if !self.required.contains(&key) {
            self.required.push(key);
        }
        self
    }
}

/// Identity of a registered unit of work, the vertex type of the dependency
/// graph. Cheap to copy, compared and hashed by [`TypeId`].
#[derive(Clone, Copy)]
pub struct UnitType {
    id: TypeId,
    name: &'static str,
    declare: fn(&mut Declarations),
}

impl UnitType {
    pub fn of<T: Bizlogic>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            declare: T::declare,
        }
    }

    /// Fully qualified name of the unit type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declarations made by this exact type, wrappers included.
    pub fn declarations(&self) -> Declarations {
        let mut decl = Declarations::default();
        (self.declare)(&mut decl);
        decl
    }

    /// Whether this type is an interception wrapper around another unit.
    pub fn is_wrapper(&self) -> bool {
        self.declarations().wrapped.is_some()
    }

    /// The programmer-declared type behind this unit: follows the chain of
    /// interception wrappers until it reaches a type that is not one.
    pub fn declaring(self) -> UnitType {
        let mut current = self;
        let mut seen = HashSet::from([current.id]);

        while let Some(inner) = current.declarations().wrapped {
            if !seen.insert(inner.id) {
                break;
            }
            current = inner;
        }

        current
    }

    /// Declarations of the declaring type, the ones the planner acts on.
    pub(crate) fn effective_declarations(self) -> Declarations {
        self.declaring().declarations()
    }

    /// Whether the declaring type emits a data item.
    pub fn is_data_adapter(&self) -> bool {
        self.effective_declarations().emission.is_some()
    }
}

impl PartialEq for UnitType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UnitType {}

impl PartialOrd for UnitType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for UnitType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitType({})", self.name)
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
