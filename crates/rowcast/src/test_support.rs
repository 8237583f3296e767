//! In-memory record used by unit tests across the crate.

use std::cell::RefCell;

use crate::model::ImportRecord;

thread_local! {
    static STORE: RefCell<Vec<TestUser>> = const { RefCell::new(Vec::new()) };
}

/// A user record backed by a thread-local store. Saving requires an email
/// containing an `@`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TestUser {
    pub email: Option<String>,
    pub f_name: Option<String>,
    pub l_name: Option<String>,
    pub confirmed_at: Option<i32>,
    pub persisted: bool,
}

impl TestUser {
    /// Insert a record into the store as already persisted.
    pub fn seed(mut user: TestUser) {
        user.persisted = true;
        STORE.with(|store| store.borrow_mut().push(user));
    }

    /// Snapshot of the store contents.
    pub fn stored() -> Vec<TestUser> {
        STORE.with(|store| store.borrow().clone())
    }

    fn valid(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| email.contains('@'))
    }
}

impl ImportRecord for TestUser {
    fn build() -> Self {
        TestUser::default()
    }

    fn persisted(&self) -> bool {
        self.persisted
    }

    fn save(&mut self) -> bool {
        if !self.valid() {
            return false;
        }

        let update = self.persisted;
        self.persisted = true;
        let saved = self.clone();

        STORE.with(|store| {
            let mut store = store.borrow_mut();
            let slot = if update {
                store.iter_mut().find(|user| user.email == saved.email)
            } else {
                None
            };
            match slot {
                Some(slot) => *slot = saved,
                None => store.push(saved),
            }
        });

        true
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "email" => self.email.clone(),
            "f_name" => self.f_name.clone(),
            "l_name" => self.l_name.clone(),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match name {
            "email" => self.email = Some(value),
            "f_name" => self.f_name = Some(value),
            "l_name" => self.l_name = Some(value),
            _ => {}
        }
    }

    fn find_by(criteria: &[(String, Option<String>)]) -> Option<Self> {
        STORE.with(|store| {
            store
                .borrow()
                .iter()
                .find(|user| {
                    criteria
                        .iter()
                        .all(|(name, value)| user.attribute(name) == *value)
                })
                .cloned()
        })
    }

    fn validation_errors(&self) -> Vec<(String, String)> {
        if self.valid() {
            Vec::new()
        } else {
            vec![("email".to_string(), "is invalid".to_string())]
        }
    }
}
