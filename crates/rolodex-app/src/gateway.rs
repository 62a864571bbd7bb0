// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ContactDraft, ContactError, ContactId, ContactRecord, NewContact};

/// Remote contact collection. Calls are blocking; each one is a single
/// request that either succeeds or reports a [`ContactError`].
pub trait ContactGateway {
    /// Human-readable description of where contacts live.
    fn describe(&self) -> String;

    fn list(&mut self) -> Result<Vec<ContactRecord>, ContactError>;

    fn get(&mut self, id: &ContactId) -> Result<ContactRecord, ContactError>;

    fn create(&mut self, contact: &NewContact) -> Result<ContactRecord, ContactError>;

    /// Applies the fields present in `draft`. Absent fields keep their
    /// stored values.
    fn update(
        &mut self,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<ContactRecord, ContactError>;

    fn remove(&mut self, id: &ContactId) -> Result<(), ContactError>;
}

impl<G: ContactGateway + ?Sized> ContactGateway for Box<G> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn list(&mut self) -> Result<Vec<ContactRecord>, ContactError> {
        (**self).list()
    }

    fn get(&mut self, id: &ContactId) -> Result<ContactRecord, ContactError> {
        (**self).get(id)
    }

    fn create(&mut self, contact: &NewContact) -> Result<ContactRecord, ContactError> {
        (**self).create(contact)
    }

    fn update(
        &mut self,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<ContactRecord, ContactError> {
        (**self).update(id, draft)
    }

    fn remove(&mut self, id: &ContactId) -> Result<(), ContactError> {
        (**self).remove(id)
    }
}
