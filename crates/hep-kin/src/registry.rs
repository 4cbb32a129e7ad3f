use std::fmt;

use hep_core::errors::{ErrorInfo, HepError};
use serde::{Deserialize, Serialize};

/// Number of species a registry holds unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

fn descriptor_error(code: &str, message: &str, name: &str) -> HepError {
    HepError::InvalidDescriptor(ErrorInfo::new(code, message).with_context("species", name))
}

/// Stable position of a species inside a [`ParticleRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex(usize);

impl TypeIndex {
    /// Wraps a raw registry position.
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw registry position.
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable species or a resonance with a natural width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticleKind {
    /// Long-lived species.
    Stable,
    /// Short-lived species that decays in two bodies.
    Resonance {
        /// Natural width in GeV.
        width: f64,
    },
}

/// Immutable descriptor of one particle species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleType {
    name: String,
    mass: f64,
    charge: i32,
    kind: ParticleKind,
}

impl ParticleType {
    /// Validates and builds a descriptor; a zero width yields a stable species.
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        charge: i32,
        width: f64,
    ) -> Result<Self, HepError> {
        let name = name.into();
        if name.is_empty() {
            return Err(descriptor_error("empty-name", "species name must not be empty", &name));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(HepError::InvalidDescriptor(
                ErrorInfo::new("mass", "mass must be finite and positive")
                    .with_context("species", name)
                    .with_context("mass", mass.to_string()),
            ));
        }
        if !width.is_finite() || width < 0.0 {
            return Err(HepError::InvalidDescriptor(
                ErrorInfo::new("width", "width must be finite and non-negative")
                    .with_context("species", name)
                    .with_context("width", width.to_string()),
            ));
        }
        let kind = if width > 0.0 {
            ParticleKind::Resonance { width }
        } else {
            ParticleKind::Stable
        };
        Ok(Self {
            name,
            mass,
            charge,
            kind,
        })
    }

    /// Species name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rest mass in GeV.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Electric charge in units of e.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Stable or resonance.
    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    /// Natural width, zero for stable species.
    pub fn width(&self) -> f64 {
        match self.kind {
            ParticleKind::Stable => 0.0,
            ParticleKind::Resonance { width } => width,
        }
    }

    /// Whether the species can be decayed.
    pub fn is_resonance(&self) -> bool {
        matches!(self.kind, ParticleKind::Resonance { .. })
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name: {}, mass: {} GeV, charge: {:+}",
            self.name, self.mass, self.charge
        )?;
        if let ParticleKind::Resonance { width } = self.kind {
            write!(f, ", width: {} GeV", width)?;
        }
        Ok(())
    }
}

/// Ordered, capacity-bounded collection of species addressed by [`TypeIndex`].
///
/// The registry is owned by the caller and passed by reference to every
/// component that needs species data. Indices are assigned in insertion
/// order and never change; re-adding a name replaces its descriptor in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRegistry {
    capacity: usize,
    types: Vec<ParticleType>,
}

impl Default for ParticleRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ParticleRegistry {
    /// Empty registry with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry holding at most `capacity` species.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            types: Vec::with_capacity(capacity),
        }
    }

    /// Registers a species or replaces the descriptor already stored under `name`.
    pub fn add_type(
        &mut self,
        name: &str,
        mass: f64,
        charge: i32,
        width: f64,
    ) -> Result<TypeIndex, HepError> {
        let descriptor = ParticleType::new(name, mass, charge, width)?;
        if let Some(position) = self.position(name) {
            tracing::debug!(species = name, index = position, "replacing particle type");
            self.types[position] = descriptor;
            return Ok(TypeIndex(position));
        }
        if self.types.len() >= self.capacity {
            return Err(HepError::CapacityExceeded(
                ErrorInfo::new("registry-full", "maximum number of particle types reached")
                    .with_context("species", name)
                    .with_context("capacity", self.capacity.to_string())
                    .with_hint("build the registry with a larger capacity"),
            ));
        }
        self.types.push(descriptor);
        Ok(TypeIndex(self.types.len() - 1))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|ty| ty.name == name)
    }

    /// Resolves a species name.
    pub fn find_type(&self, name: &str) -> Result<TypeIndex, HepError> {
        self.position(name).map(TypeIndex).ok_or_else(|| {
            HepError::TypeNotFound(
                ErrorInfo::new("unknown-name", "no particle type with this name")
                    .with_context("species", name),
            )
        })
    }

    /// Descriptor stored at `index`.
    pub fn get(&self, index: TypeIndex) -> Result<&ParticleType, HepError> {
        self.types.get(index.0).ok_or_else(|| {
            HepError::TypeNotFound(
                ErrorInfo::new("unknown-index", "no particle type at this index")
                    .with_context("index", index.0.to_string())
                    .with_context("len", self.types.len().to_string()),
            )
        })
    }

    /// Number of registered species.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no species are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Maximum number of species.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Species in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeIndex, &ParticleType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(idx, ty)| (TypeIndex(idx), ty))
    }

    /// One line per species, suitable for a type listing.
    pub fn describe(&self) -> Vec<String> {
        self.iter()
            .map(|(index, ty)| format!("[{}] {}", index, ty))
            .collect()
    }
}
