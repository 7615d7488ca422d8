//! Revision session management for memorized verses.
//! Handles multi-round revision of due verses with scheduler integration.

use super::{MemorizationStore, RevisionCard};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Manages a revision session with multiple rounds.
/// Verses that are not recalled are repeated in subsequent rounds.
pub struct RevisionSession<'a, S: MemorizationStore + ?Sized> {
    pub all_cards: Vec<RevisionCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub round_number: usize,
    store: &'a S,
    now: DateTime<Utc>,
}

impl<'a, S: MemorizationStore + ?Sized> RevisionSession<'a, S> {
    /// Loads the verses due at `now` from the store and starts the first round.
    pub fn start(store: &'a S, now: DateTime<Utc>) -> Result<Self> {
        let due = store
            .due_for_revision(now)
            .context("Failed to load verses due for revision")?;
        log::info!("Starting revision session with {} due verses", due.len());

        let all_cards: Vec<_> = due.into_iter().map(RevisionCard::new).collect();
        let indices: Vec<usize> = (0..all_cards.len()).collect();

        Ok(Self {
            all_cards,
            current_round_cards: indices,
            current_index: 0,
            round_number: 1,
            store,
            now,
        })
    }

    pub fn current_card(&self) -> Option<&RevisionCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the verses that were not recalled.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_cards
                    .get(idx)
                    .map(|card| !card.is_recalled)
                    .unwrap_or(false)
            })
            .collect();

        if failed_indices.is_empty() {
            return;
        }

        self.current_round_cards = failed_indices;
        self.current_index = 0;
        self.round_number += 1;
        log::debug!(
            "Round {} with {} verses to retry",
            self.round_number,
            self.current_round_cards.len()
        );
    }

    /// Grades the current verse and persists its new schedule through the store.
    ///
    /// On a store error the in-memory record keeps its previous state.
    pub fn grade_current_card(&mut self, recalled: bool) -> Result<()> {
        let Some(&actual_idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(());
        };
        let Some(card) = self.all_cards.get_mut(actual_idx) else {
            return Ok(());
        };

        let mut updated = card.record.clone();
        if recalled {
            updated.record_success(self.now);
        } else {
            updated.record_failure(self.now);
        }

        self.store
            .save_revision(&updated)
            .with_context(|| format!("Failed to save revision of {}", updated.reference()))?;

        log::info!(
            "Verse {} {}: mastery {}%, next revision {}",
            updated.reference(),
            if recalled { "recalled" } else { "missed" },
            updated.mastery_level,
            updated
                .next_revision
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        );

        if recalled {
            card.mark_as_recalled(self.now);
        } else {
            card.is_recalled = false;
        }
        card.record = updated;
        Ok(())
    }

    pub fn recalled_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| {
                self.all_cards
                    .get(idx)
                    .map(|card| card.is_recalled)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.recalled_count()
    }

    /// Returns true when every verse of the current round has been recalled.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.recalled_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} verses", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} verses to revise again",
                self.round_number,
                self.total_count()
            )
        }
    }
}
