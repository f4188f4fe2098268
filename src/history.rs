// ABOUTME: Locally saved conversation list with upsert, delete and tenant visibility filtering
// ABOUTME: Backed by the chat-conversations key of the persistence adapter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use crate::storage::Persistence;
use dom360_core::constants::storage_keys;
use dom360_core::models::{ConversationId, Identity, SavedConversation};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Saved conversations, newest first
#[derive(Debug)]
pub struct ConversationHistory {
    persistence: Persistence,
    write_lock: Mutex<()>,
}

impl ConversationHistory {
    /// Create a history over the persistence adapter
    #[must_use]
    pub fn new(persistence: Persistence) -> Self {
        Self {
            persistence,
            write_lock: Mutex::new(()),
        }
    }

    /// Every saved conversation
    #[must_use]
    pub fn list(&self) -> Vec<SavedConversation> {
        self.persistence.get(storage_keys::CONVERSATIONS, Vec::new())
    }

    /// One saved conversation
    #[must_use]
    pub fn get(&self, id: &ConversationId) -> Option<SavedConversation> {
        self.list().into_iter().find(|entry| &entry.id == id)
    }

    /// Insert or replace a conversation
    ///
    /// Conversations with one message or fewer are not saved. A replaced entry
    /// keeps its position and original `created_at`; new entries go first.
    /// Returns whether the list was written.
    pub fn save(&self, mut conversation: SavedConversation) -> bool {
        if conversation.messages.len() <= 1 {
            return false;
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.list();
        if let Some(existing) = entries.iter_mut().find(|entry| entry.id == conversation.id) {
            conversation.created_at = existing.created_at;
            *existing = conversation;
        } else {
            entries.insert(0, conversation);
        }
        debug!(entries = entries.len(), "Saving conversation history");
        self.persistence.set(storage_keys::CONVERSATIONS, &entries)
    }

    /// Remove a conversation; returns whether it existed
    pub fn delete(&self, id: &ConversationId) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|entry| &entry.id != id);
        if entries.len() == before {
            return false;
        }
        self.persistence.set(storage_keys::CONVERSATIONS, &entries)
    }

    /// Conversations the identity may see
    ///
    /// MASTER sees everything; other roles only see their own tenant.
    #[must_use]
    pub fn visible_to(&self, identity: &Identity) -> Vec<SavedConversation> {
        let entries = self.list();
        if identity.role.is_global() {
            return entries;
        }
        entries
            .into_iter()
            .filter(|entry| entry.tenant_id.is_some() && entry.tenant_id == identity.tenant_id)
            .collect()
    }
}
