//! Entities module - Contratto di identità delle entità persistite
//!
//! Every persisted type implements [`Entity`]: it exposes an identity field whose
//! type implements [`EntityId`]. An identity equal to the type's default value
//! means "not yet assigned by the store".

pub mod audit;
pub mod weather_forecast;

// Re-exports per facilitare l'import
pub use audit::{Audit, AuditedEntity};
pub use weather_forecast::WeatherForecast;

use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{Debug, Display};
use uuid::Uuid;

/// Identity value of an [`Entity`].
///
/// The default value of the type is the "unassigned" sentinel.
pub trait EntityId:
    Clone + Default + Eq + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// `true` when the identity still equals the unassigned sentinel
    fn is_unassigned(&self) -> bool {
        *self == Self::default()
    }

    /// Key used by the store to address the row
    fn to_key(&self) -> String {
        self.to_string()
    }

    /// Converts a store-issued sequence number into an identity.
    ///
    /// # Returns
    /// * `Some(id)` - identity to assign to a newly inserted entity
    /// * `None` - the sequence no longer fits the identity type
    fn from_sequence(sequence: i64) -> Option<Self>;
}

macro_rules! integer_entity_id {
    ($($ty:ty),*) => {
        $(
            impl EntityId for $ty {
                fn from_sequence(sequence: i64) -> Option<Self> {
                    <$ty>::try_from(sequence).ok().filter(|id| *id != 0)
                }
            }
        )*
    };
}

integer_entity_id!(i32, i64, u32, u64);

impl EntityId for String {
    fn from_sequence(sequence: i64) -> Option<Self> {
        (sequence > 0).then(|| sequence.to_string())
    }
}

// uuid identities are random, the sequence is only used to detect collisions
impl EntityId for Uuid {
    fn from_sequence(_sequence: i64) -> Option<Self> {
        Some(Uuid::new_v4())
    }
}

/// A record that can be persisted by a [`Store`](crate::store::Store).
///
/// # Example
/// ```
/// use crudgate::entities::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Debug, Clone)]
/// struct Book {
///     id: i32,
///     title: String,
/// }
///
/// impl Entity for Book {
///     type Id = i32;
///     const RESOURCE: &'static str = "books";
///
///     fn id(&self) -> &i32 {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: i32) {
///         self.id = id;
///     }
/// }
///
/// let book = Book { id: 0, title: "Dune".into() };
/// assert!(!book.has_assigned_id());
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Type of the identity field
    type Id: EntityId;

    /// Name of the resource, used as the store discriminator and in messages
    const RESOURCE: &'static str;

    fn id(&self) -> &Self::Id;

    fn set_id(&mut self, id: Self::Id);

    fn has_assigned_id(&self) -> bool {
        !self.id().is_unassigned()
    }
}
