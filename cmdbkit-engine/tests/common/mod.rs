//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use cmdbkit_engine::{ObjectManager, StaticDirectory, TypeManager};
use cmdbkit_model::{FieldDef, TypeSchema};
use cmdbkit_store::DocumentStore;
use cmdbkit_types::PublicId;
use std::sync::Arc;

pub const ADMIN_USER: PublicId = PublicId::new(100);
pub const ADMIN_GROUP: PublicId = PublicId::new(1);
pub const VIEWER_USER: PublicId = PublicId::new(101);
pub const VIEWER_GROUP: PublicId = PublicId::new(2);
pub const OUTSIDER_USER: PublicId = PublicId::new(102);
pub const OUTSIDER_GROUP: PublicId = PublicId::new(3);

pub struct TestEnv {
    pub store: Arc<DocumentStore>,
    pub types: TypeManager,
    pub objects: ObjectManager,
}

pub fn env() -> TestEnv {
    let store = Arc::new(DocumentStore::open_in_memory().unwrap());
    let directory = Arc::new(
        StaticDirectory::new()
            .with_user(ADMIN_USER, "admin", ADMIN_GROUP)
            .with_user(VIEWER_USER, "viewer", VIEWER_GROUP)
            .with_user(OUTSIDER_USER, "outsider", OUTSIDER_GROUP),
    );
    TestEnv {
        types: TypeManager::new(Arc::clone(&store)),
        objects: ObjectManager::new(Arc::clone(&store), directory),
        store,
    }
}

/// Inserts a "server" type: one summary text field `name`, ACL disabled.
pub fn create_server_type(env: &TestEnv) -> PublicId {
    let mut schema = TypeSchema::new(PublicId::new(0), "server", "Server");
    schema.fields = vec![FieldDef::text("name", "Name")];
    schema.render_meta.summary.fields = vec!["name".into()];
    env.types.insert_type(schema).unwrap()
}

/// Inserts a "network" type: summary text field `name`, ACL disabled.
pub fn create_network_type(env: &TestEnv) -> PublicId {
    let mut schema = TypeSchema::new(PublicId::new(0), "network", "Network");
    schema.fields = vec![FieldDef::text("name", "Name")];
    schema.render_meta.summary.fields = vec!["name".into()];
    env.types.insert_type(schema).unwrap()
}

/// Inserts a "vlan" type with a `network` ref field pointing at the given
/// network type.
pub fn create_vlan_type(env: &TestEnv, network_type: PublicId) -> PublicId {
    let mut schema = TypeSchema::new(PublicId::new(0), "vlan", "VLAN");
    schema.fields = vec![
        FieldDef::text("name", "Name"),
        FieldDef::reference("network", "Network", vec![network_type]),
    ];
    schema.render_meta.summary.fields = vec!["name".into()];
    env.types.insert_type(schema).unwrap()
}
