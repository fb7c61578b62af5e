//! Priority speech scheduling over a host speech backend

use std::collections::VecDeque;

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Host speech backend. `speak` starts playback and returns
/// immediately; the host reports the outcome back through
/// [`AnnouncementQueue::playback_finished`] or
/// [`AnnouncementQueue::playback_failed`]. Voice, rate and pitch are
/// the host's business.
pub trait SpeechOutput {
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}

/// FIFO of pending messages with exactly one playing at a time.
///
/// High priority preempts: current playback is cancelled and re-queued
/// behind the new message, which jumps to the front. Normal and low
/// priority append. Playback errors advance the queue like normal
/// completion; the failed message is not retried.
pub struct AnnouncementQueue {
    speech: Box<dyn SpeechOutput>,
    pending: VecDeque<String>,
    playing: Option<String>,
}

impl AnnouncementQueue {
    pub fn new(speech: Box<dyn SpeechOutput>) -> AnnouncementQueue {
        AnnouncementQueue {
            speech,
            pending: VecDeque::new(),
            playing: None,
        }
    }

    pub fn enqueue(&mut self, text: impl Into<String>, priority: Priority) {
        let text = text.into();
        match priority {
            Priority::High => {
                if let Some(interrupted) = self.playing.take() {
                    self.speech.cancel();
                    self.pending.push_front(interrupted);
                }
                self.pending.push_front(text);
                self.play_next();
            }
            Priority::Normal | Priority::Low => {
                self.pending.push_back(text);
                if self.playing.is_none() {
                    self.play_next();
                }
            }
        }
    }

    /// Host callback: the current message finished playing
    pub fn playback_finished(&mut self) {
        self.playing = None;
        self.play_next();
    }

    /// Host callback: playback failed. Treated as completion.
    pub fn playback_failed(&mut self) {
        if let Some(text) = self.playing.take() {
            debug!("Speech playback failed, skipping: {text}");
        }
        self.play_next();
    }

    /// Clear the queue and halt playback immediately
    pub fn stop(&mut self) {
        self.pending.clear();
        if self.playing.take().is_some() {
            self.speech.cancel();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.playing.is_none() && self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn play_next(&mut self) {
        if self.playing.is_some() {
            return;
        }
        if let Some(text) = self.pending.pop_front() {
            self.speech.speak(&text);
            self.playing = Some(text);
        }
    }
}
