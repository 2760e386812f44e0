use uuid::Uuid;

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub const MAX_BIO_CHARS: usize = 2000;

pub struct UpdateProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug)]
pub enum UpdateProfileOutcome {
    Updated(UserRow),
    NotFound,
    Invalid(&'static str),
}

impl<'a, R: UserRepository + ?Sized> UpdateProfile<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<UpdateProfileOutcome> {
        let name = changes.name.as_deref().map(str::trim);
        if name == Some("") {
            return Ok(UpdateProfileOutcome::Invalid("name must not be blank"));
        }
        let bio = changes.bio.as_deref().map(str::trim);
        if bio.map(|b| b.chars().count() > MAX_BIO_CHARS).unwrap_or(false) {
            return Ok(UpdateProfileOutcome::Invalid("bio is too long"));
        }
        match self.repo.update_profile(user_id, name, bio).await? {
            Some(u) => Ok(UpdateProfileOutcome::Updated(u)),
            None => Ok(UpdateProfileOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        let user = store.create_user("a@x.test", "Ann", "h").await.unwrap().unwrap();
        let uc = UpdateProfile { repo: &store };

        let out = uc
            .execute(
                user.id,
                &ProfileChanges {
                    name: None,
                    bio: Some("  reads a lot ".into()),
                },
            )
            .await
            .unwrap();
        let UpdateProfileOutcome::Updated(u) = out else {
            panic!("expected update");
        };
        assert_eq!(u.name, "Ann");
        assert_eq!(u.bio.as_deref(), Some("reads a lot"));
    }

    #[tokio::test]
    async fn blank_name_and_unknown_user() {
        let store = MemoryStore::new();
        let uc = UpdateProfile { repo: &store };
        let blank = ProfileChanges {
            name: Some("   ".into()),
            bio: None,
        };
        assert!(matches!(
            uc.execute(Uuid::new_v4(), &blank).await.unwrap(),
            UpdateProfileOutcome::Invalid(_)
        ));
        assert!(matches!(
            uc.execute(Uuid::new_v4(), &ProfileChanges::default())
                .await
                .unwrap(),
            UpdateProfileOutcome::NotFound
        ));
    }
}
