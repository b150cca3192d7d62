//! # ts-keycloak
//!
//! Reconciles a Keycloak server with a declared test fixture.
//!
//! Provisioning always runs in the same order and stops at the first failure:
//!
//! 1. connect (administrator password grant)
//! 2. recreate the test realm
//! 3. create the test client
//! 4. recreate the test user and set its permanent password
//! 5. recreate the realm role and assign it to the user
//!
//! Keycloak has no atomic upsert, so every step is delete-then-create. The
//! realm is dropped and rebuilt on every run: never point this at a realm
//! whose data matters.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod admin;
pub mod client;
pub mod dto;
pub mod error;
pub mod fixture;
pub mod pipeline;
pub mod session;

pub use admin::{IdentityAdmin, RealmHandle, UserHandle};
pub use client::{AdminClient, CreatedResource};
pub use error::{KeycloakError, KeycloakResult, ProvisionError, ProvisionStep};
pub use fixture::{ClientFixture, FixtureSet, RealmFixture, RoleFixture, UserFixture};
pub use pipeline::{provision, ProvisionReport, ProvisioningPipeline};
pub use session::KeycloakAdminSession;
