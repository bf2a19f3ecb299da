//! Resource trait for declarative state management
//!
//! A Resource maps a create/read/update/delete lifecycle for one kind of
//! remote object onto whatever API manages it. The framework decides what
//! to call and when; the resource only translates.

use crate::data::ResourceData;
use crate::schema::Schema;
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// `M` is the provider metadata handed to every operation, typically a
/// session that produces API clients.
///
/// # Example
///
/// ```
/// use declarative::{Attribute, Resource, ResourceData, Schema};
/// use serde_json::json;
///
/// #[derive(Debug)]
/// struct Note {
///     schema: Schema,
/// }
///
/// impl Resource<()> for Note {
///     fn type_name(&self) -> &'static str {
///         "note"
///     }
///
///     fn schema(&self) -> &Schema {
///         &self.schema
///     }
///
///     fn create(&self, data: &mut ResourceData, _meta: &()) -> anyhow::Result<()> {
///         let text = data.get("text").cloned().unwrap_or(json!(""));
///         data.set_id("note-1");
///         data.set("text", text);
///         Ok(())
///     }
///
///     fn read(&self, _data: &mut ResourceData, _meta: &()) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     fn update(&self, data: &mut ResourceData, meta: &()) -> anyhow::Result<()> {
///         self.create(data, meta)
///     }
///
///     fn delete(&self, data: &mut ResourceData, _meta: &()) -> anyhow::Result<()> {
///         data.clear_id();
///         Ok(())
///     }
///
///     fn exists(&self, data: &ResourceData, _meta: &()) -> anyhow::Result<bool> {
///         Ok(data.id().is_some())
///     }
/// }
///
/// let note = Note {
///     schema: Schema::new().with_attribute("text", Attribute::string().required()),
/// };
/// let config = json!({"text": "hi"}).as_object().cloned().unwrap();
/// let mut data = ResourceData::new(config);
/// note.create(&mut data, &()).unwrap();
/// assert_eq!(data.id(), Some("note-1"));
/// ```
pub trait Resource<M: ?Sized>: Send + Sync + fmt::Debug {
    /// Resource type name, e.g. "ibm_openwhisk_action"
    fn type_name(&self) -> &'static str;

    /// Attributes this resource accepts
    fn schema(&self) -> &Schema;

    /// Create the remote object and record its identifier
    ///
    /// On failure the identifier must be left unset.
    fn create(&self, data: &mut ResourceData, meta: &M) -> Result<()>;

    /// Refresh the new state from the remote object
    fn read(&self, data: &mut ResourceData, meta: &M) -> Result<()>;

    /// Change the remote object in place
    fn update(&self, data: &mut ResourceData, meta: &M) -> Result<()>;

    /// Remove the remote object and clear the identifier
    fn delete(&self, data: &mut ResourceData, meta: &M) -> Result<()>;

    /// Whether the tracked remote object still exists
    fn exists(&self, data: &ResourceData, meta: &M) -> Result<bool>;

    /// Adopt an existing remote object by identifier
    fn import(&self, id: &str, data: &mut ResourceData, meta: &M) -> Result<()> {
        data.set_id(id);
        self.read(data, meta)
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource<M> = Box<dyn Resource<M>>;
