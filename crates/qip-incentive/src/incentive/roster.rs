use super::diagnostics::DataQualityWarning;
use super::domain::{AreaScope, Employee, EmployeeId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Employees of one run, indexed by number and by reporting line.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    employees: BTreeMap<EmployeeId, Employee>,
    reports: BTreeMap<EmployeeId, Vec<EmployeeId>>,
}

impl Roster {
    /// Later rows win when an employee number repeats.
    pub fn from_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let employees: BTreeMap<EmployeeId, Employee> = employees
            .into_iter()
            .map(|employee| (employee.id.clone(), employee))
            .collect();

        let mut reports: BTreeMap<EmployeeId, Vec<EmployeeId>> = BTreeMap::new();
        for employee in employees.values() {
            if let Some(manager) = &employee.manager {
                reports
                    .entry(manager.clone())
                    .or_default()
                    .push(employee.id.clone());
            }
        }

        Self { employees, reports }
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn contains(&self, id: &EmployeeId) -> bool {
        self.employees.contains_key(id)
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.get(id)
    }

    /// Employees in ascending employee-number order.
    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    /// Manager references that point outside the roster.
    pub fn dangling_managers(&self) -> Vec<DataQualityWarning> {
        self.employees
            .values()
            .filter_map(|employee| {
                employee
                    .manager
                    .as_ref()
                    .filter(|manager| !self.contains(manager))
                    .map(|manager| DataQualityWarning::UnknownManager {
                        employee: employee.id.clone(),
                        manager: manager.clone(),
                    })
            })
            .collect()
    }

    pub fn direct_reports(&self, id: &EmployeeId) -> &[EmployeeId] {
        self.reports.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct reports, or the whole reporting subtree when `transitive`.
    pub fn subordinates(&self, id: &EmployeeId, transitive: bool) -> Vec<&Employee> {
        let mut seen: BTreeSet<&EmployeeId> = BTreeSet::new();
        let mut queue: VecDeque<&EmployeeId> = self.direct_reports(id).iter().collect();
        let mut found = Vec::new();

        while let Some(next) = queue.pop_front() {
            if next == id || !seen.insert(next) {
                continue;
            }
            if let Some(employee) = self.employees.get(next) {
                found.push(employee);
            }
            if transitive {
                queue.extend(self.direct_reports(next));
            }
        }

        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// Employees whose home buildings fall inside `scope`.
    pub fn area_members<'r>(&'r self, scope: &'r AreaScope) -> impl Iterator<Item = &'r Employee> {
        self.employees
            .values()
            .filter(move |employee| match &employee.area {
                AreaScope::Buildings(buildings) => {
                    buildings.iter().any(|building| scope.covers(building))
                }
                AreaScope::All | AreaScope::Unassigned => false,
            })
    }

    /// Area members plus the full reporting subtree of `employee`.
    pub fn team(&self, employee: &Employee) -> BTreeSet<EmployeeId> {
        let mut team: BTreeSet<EmployeeId> = self
            .area_members(&employee.area)
            .map(|member| member.id.clone())
            .collect();
        team.extend(
            self.subordinates(&employee.id, true)
                .into_iter()
                .map(|member| member.id.clone()),
        );
        team
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incentive::domain::{OrgType, PositionPath};

    fn employee(id: &str, area: &str, manager: Option<&str>) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            name: id.to_string(),
            org_type: OrgType::Type1,
            position: PositionPath::new("ASSEMBLY INSPECTOR"),
            area: AreaScope::parse(area),
            manager: manager.map(EmployeeId::new),
        }
    }

    fn roster() -> Roster {
        Roster::from_employees([
            employee("S1", "ALL", None),
            employee("L1", "B1", Some("S1")),
            employee("L2", "B2", Some("S1")),
            employee("I1", "B1", Some("L1")),
            employee("I2", "B1", Some("L1")),
            employee("I3", "B2", Some("L2")),
            employee("X1", "B3", Some("GHOST")),
        ])
    }

    fn ids(employees: Vec<&Employee>) -> Vec<&str> {
        employees.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn subordinates_follow_reporting_chain() {
        let roster = roster();
        let supervisor = EmployeeId::new("S1");
        assert_eq!(ids(roster.subordinates(&supervisor, false)), vec!["L1", "L2"]);
        assert_eq!(
            ids(roster.subordinates(&supervisor, true)),
            vec!["I1", "I2", "I3", "L1", "L2"]
        );
        assert!(roster.subordinates(&EmployeeId::new("I1"), true).is_empty());
    }

    #[test]
    fn subordinates_survive_reporting_cycles() {
        let roster = Roster::from_employees([
            employee("A", "B1", Some("B")),
            employee("B", "B1", Some("A")),
        ]);
        assert_eq!(ids(roster.subordinates(&EmployeeId::new("A"), true)), vec!["B"]);
    }

    #[test]
    fn team_joins_area_members_and_subtree() {
        let roster = roster();
        let leader = roster.get(&EmployeeId::new("L2")).expect("present").clone();
        let team: Vec<String> = roster.team(&leader).into_iter().map(|id| id.0).collect();
        assert_eq!(team, vec!["I3", "L2"]);

        let supervisor = roster.get(&EmployeeId::new("S1")).expect("present").clone();
        assert_eq!(roster.team(&supervisor).len(), 6);
    }

    #[test]
    fn dangling_manager_is_reported() {
        assert_eq!(
            roster().dangling_managers(),
            vec![DataQualityWarning::UnknownManager {
                employee: EmployeeId::new("X1"),
                manager: EmployeeId::new("GHOST"),
            }]
        );
    }
}
