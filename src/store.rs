use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};

use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::holiday::{Holiday, HolidayKind};
use crate::model::leave::{LeaveRequest, LeaveTypeConfig};
use crate::model::notification::Notification;
use crate::model::payslip::Payslip;
use crate::model::project::{Project, ProjectStatus};
use crate::model::role::Role;
use crate::model::time_entry::TimeEntry;
use crate::model::user::User;

/// Issued refresh token. Revocation is a flag flip, never a delete, so a
/// replayed token stays refused.
#[derive(Debug, Clone)]
pub struct RefreshTokenRec {
    pub user_id: u64,
    pub revoked: bool,
}

/// Session-scoped repository holding every entity collection. Handlers get
/// it injected as `web::Data<Store>`; there is no persistence behind it,
/// mutations are plain in-memory vector edits under the entity's lock.
#[derive(Default)]
pub struct Store {
    next_id: AtomicU64,
    pub users: RwLock<Vec<User>>,
    pub departments: RwLock<Vec<Department>>,
    pub projects: RwLock<Vec<Project>>,
    pub leaves: RwLock<Vec<LeaveRequest>>,
    pub leave_types: RwLock<Vec<LeaveTypeConfig>>,
    pub time_entries: RwLock<Vec<TimeEntry>>,
    pub attendance: RwLock<Vec<AttendanceRecord>>,
    pub holidays: RwLock<Vec<Holiday>>,
    pub payslips: RwLock<Vec<Payslip>>,
    pub notifications: RwLock<Vec<Notification>>,
    pub refresh_tokens: RwLock<HashMap<String, RefreshTokenRec>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .expect("store poisoned")
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn user_by_id(&self, id: u64) -> Option<User> {
        self.users
            .read()
            .expect("store poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn user_name(&self, id: u64) -> Option<String> {
        self.user_by_id(id).map(|u| u.name)
    }

    /// Appends to the recipient's notification feed. Fire-and-forget: there
    /// is no acknowledgement and no delivery guarantee.
    pub fn notify(&self, user_id: u64, message: impl Into<String>) {
        let id = self.next_id();
        self.notifications
            .write()
            .expect("store poisoned")
            .push(Notification {
                id,
                user_id,
                message: message.into(),
                read: false,
                created_at: Utc::now(),
            });
    }

    /// Notifies every user holding the given role.
    pub fn notify_role(&self, role: Role, message: &str) {
        let recipients: Vec<u64> = self
            .users
            .read()
            .expect("store poisoned")
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.id)
            .collect();
        for user_id in recipients {
            self.notify(user_id, message);
        }
    }

    /// Demo dataset for a fresh instance. All seeded accounts share the
    /// given password hash.
    pub fn seeded(password_hash: &str) -> Self {
        let store = Store::new();

        {
            let mut departments = store.departments.write().expect("store poisoned");
            for (name, description) in [
                ("Engineering", "Software Development and IT"),
                ("Human Resources", "People and Culture"),
                ("Product", "Product Management and Design"),
                ("Executive", "C-Level Management"),
            ] {
                departments.push(Department {
                    id: store.next_id(),
                    name: name.into(),
                    description: Some(description.into()),
                    // department heads are wired up after all users exist
                    manager_id: None,
                });
            }
        }

        {
            let mut projects = store.projects.write().expect("store poisoned");
            projects.push(Project {
                id: store.next_id(),
                name: "Website Revamp".into(),
                description: Some("Modernizing the corporate portal".into()),
                status: ProjectStatus::Active,
                due_date: NaiveDate::from_ymd_opt(2026, 12, 31),
                tasks: ["Development", "Design", "Testing", "Planning", "Deployment"]
                    .map(String::from)
                    .to_vec(),
            });
            projects.push(Project {
                id: store.next_id(),
                name: "Mobile App V2".into(),
                description: Some("Adding biometric login".into()),
                status: ProjectStatus::Active,
                due_date: NaiveDate::from_ymd_opt(2026, 9, 30),
                tasks: ["Frontend", "Backend API", "UX Research", "QA"]
                    .map(String::from)
                    .to_vec(),
            });
            projects.push(Project {
                id: store.next_id(),
                name: "Q3 Recruitment".into(),
                description: Some("Hiring for sales team".into()),
                status: ProjectStatus::Completed,
                due_date: None,
                tasks: ["Sourcing", "Interviews", "Onboarding", "Documentation"]
                    .map(String::from)
                    .to_vec(),
            });
        }

        let project_ids: Vec<u64> = store
            .projects
            .read()
            .expect("store poisoned")
            .iter()
            .map(|p| p.id)
            .collect();
        let dept_ids: Vec<u64> = store
            .departments
            .read()
            .expect("store poisoned")
            .iter()
            .map(|dp| dp.id)
            .collect();

        {
            let mut users = store.users.write().expect("store poisoned");
            let mut add = |name: &str,
                           email: &str,
                           role: Role,
                           department: usize,
                           projects: &[usize],
                           phone: &str,
                           job_title: &str,
                           hire_date: &str| {
                let id = store.next_id();
                users.push(User {
                    id,
                    name: name.into(),
                    email: email.into(),
                    password_hash: password_hash.into(),
                    role,
                    // manager links are wired up after all users exist
                    manager_id: None,
                    department_id: Some(dept_ids[department]),
                    project_ids: projects.iter().map(|&i| project_ids[i]).collect(),
                    phone: Some(phone.into()),
                    job_title: Some(job_title.into()),
                    hire_date: hire_date.parse().ok(),
                });
                id
            };

            let alice = add(
                "Alice Employee",
                "alice@nexus.com",
                Role::Employee,
                0,
                &[0, 1],
                "+1 555-0101",
                "Senior Frontend Developer",
                "2022-03-15",
            );
            let bob = add(
                "Bob Manager",
                "bob@nexus.com",
                Role::Manager,
                0,
                &[0],
                "+1 555-0102",
                "Engineering Manager",
                "2020-06-01",
            );
            let charlie = add(
                "Charlie HR",
                "charlie@nexus.com",
                Role::Hr,
                1,
                &[2],
                "+1 555-0103",
                "HR Director",
                "2019-01-10",
            );
            let david = add(
                "David Dev",
                "david@nexus.com",
                Role::Employee,
                2,
                &[1],
                "+1 555-0104",
                "Product Owner",
                "2023-01-20",
            );
            let eve = add(
                "Eve Exec",
                "eve@nexus.com",
                Role::Manager,
                3,
                &[],
                "+1 555-0105",
                "VP of Operations",
                "2018-11-05",
            );

            for u in users.iter_mut() {
                u.manager_id = match u.id {
                    id if id == alice || id == david => Some(bob),
                    id if id == bob => Some(charlie),
                    _ => None,
                };
            }
            drop(users);

            let mut departments = store.departments.write().expect("store poisoned");
            let heads = [bob, charlie, eve, eve];
            for (dept, head) in departments.iter_mut().zip(heads) {
                dept.manager_id = Some(head);
            }
        }

        {
            let mut leave_types = store.leave_types.write().expect("store poisoned");
            for (name, days, description) in [
                ("Annual Leave", 20, "Standard annual vacation leave"),
                (
                    "Compassionate Leave",
                    5,
                    "Leave for family emergencies and bereavement",
                ),
                ("Loss of Pay", 10, "Unpaid leave for personal reasons"),
                ("Paternity Leave", 15, "Leave for new fathers"),
                ("Sick Leave", 12, "Medical and health-related leave"),
            ] {
                leave_types.push(LeaveTypeConfig {
                    id: store.next_id(),
                    name: name.into(),
                    days,
                    description: description.into(),
                    is_active: true,
                });
            }
        }

        {
            let mut holidays = store.holidays.write().expect("store poisoned");
            for (name, date, kind, description) in [
                (
                    "New Year",
                    "2026-01-01",
                    HolidayKind::Public,
                    "Celebration of the new year",
                ),
                (
                    "Company Anniversary",
                    "2026-08-15",
                    HolidayKind::Company,
                    "Celebrating 10 years of Nexus",
                ),
                ("Christmas", "2026-12-25", HolidayKind::Public, "Christmas Day"),
            ] {
                holidays.push(Holiday {
                    id: store.next_id(),
                    name: name.into(),
                    date: date.parse().expect("seed holiday date"),
                    kind,
                    description: Some(description.into()),
                });
            }
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let store = Store::new();
        let a = store.next_id();
        let b = store.next_id();
        assert!(b > a);
    }

    #[test]
    fn seeded_store_has_the_demo_org() {
        let store = Store::seeded("hash");
        assert_eq!(store.users.read().unwrap().len(), 5);
        assert_eq!(store.departments.read().unwrap().len(), 4);
        assert_eq!(store.projects.read().unwrap().len(), 3);
        assert_eq!(store.leave_types.read().unwrap().len(), 5);
        assert_eq!(store.holidays.read().unwrap().len(), 3);

        let alice = store.user_by_email("alice@nexus.com").unwrap();
        assert_eq!(alice.role, Role::Employee);
        assert!(alice.manager_id.is_some());
    }

    #[test]
    fn notify_role_reaches_every_holder() {
        let store = Store::seeded("hash");
        store.notify_role(Role::Manager, "payroll closed");
        let notifications = store.notifications.read().unwrap();
        assert_eq!(notifications.len(), 2); // Bob and Eve
        assert!(notifications.iter().all(|n| !n.read));
    }
}
