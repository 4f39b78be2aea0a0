use wayfinder_model::ModelMessage;

/// Messages exchanged with the model, in the order they are replayed.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    #[inline]
    pub fn push(&mut self, msg: ModelMessage) {
        self.messages.push(msg);
    }

    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
