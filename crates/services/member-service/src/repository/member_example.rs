//! Query by example over members.
//!
//! A sample `Member` supplies the values to match. Every property that is
//! present on the sample and not ignored becomes an equality condition; the
//! team is matched by name through an inner join.

use sea_orm::{ColumnTrait, QueryFilter};

use domain::{Member, Team};
use persistence::Specification;

use super::entities::member;
use super::member_spec;

/// Member properties an example can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberPath {
    Id,
    Username,
    Age,
    TeamName,
}

/// Sample member plus the properties to leave out of the match.
///
/// `age` is always present on a sample, so it is matched unless ignored.
#[derive(Debug, Clone)]
pub struct MemberExample {
    sample: Member,
    team_name: Option<String>,
    ignored: Vec<MemberPath>,
}

impl MemberExample {
    pub fn of(sample: Member) -> Self {
        Self {
            sample,
            team_name: None,
            ignored: Vec::new(),
        }
    }

    /// Match members of a team with the same name as `team`
    pub fn with_team(mut self, team: &Team) -> Self {
        self.team_name = Some(team.name.clone());
        self
    }

    pub fn ignoring(mut self, path: MemberPath) -> Self {
        if !self.ignored.contains(&path) {
            self.ignored.push(path);
        }
        self
    }

    fn matches(&self, path: MemberPath) -> bool {
        !self.ignored.contains(&path)
    }

    pub fn to_specification(&self) -> Specification<member::Entity> {
        let mut spec = Specification::none();

        if let Some(id) = self.sample.id.filter(|_| self.matches(MemberPath::Id)) {
            spec = spec.and(Specification::new(move |select| select.filter(member::Column::Id.eq(id))));
        }
        if self.matches(MemberPath::Username) {
            let username = self.sample.username.clone();
            spec = spec.and(Specification::new(move |select| {
                select.filter(member::Column::Username.eq(username.clone()))
            }));
        }
        if self.matches(MemberPath::Age) {
            let age = self.sample.age;
            spec = spec.and(Specification::new(move |select| select.filter(member::Column::Age.eq(age))));
        }
        if self.matches(MemberPath::TeamName) {
            spec = spec.and(member_spec::team_name(self.team_name.as_deref()));
        }

        spec
    }
}
