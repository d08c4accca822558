//! Task and reward catalogs.
//!
//! Both catalogs are fixed for the lifetime of the process and shared by
//! every account. Order is declaration order and is preserved in listings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type TaskId = u32;
pub type RewardId = u32;

/// A unit of work worth a fixed number of coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub value: u64,
}

/// An item redeemable once per account for a fixed cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub label: String,
    pub cost: u64,
}

#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
}

impl TaskCatalog {
    /// Build a catalog, rejecting duplicate ids and blank titles.
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        check_entries(
            "tasks",
            tasks.iter().map(|task| (task.id, task.title.as_str())),
        )?;
        // Balances are bounded by the catalog total, so the total must fit.
        tasks
            .iter()
            .try_fold(0u64, |acc, task| acc.checked_add(task.value))
            .ok_or_else(|| Error::InvalidConfig("tasks: total value overflows".to_string()))?;
        Ok(Self { tasks })
    }

    pub fn list_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self {
            tasks: default_tasks(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Build a catalog, rejecting duplicate ids and blank labels.
    pub fn new(rewards: Vec<Reward>) -> Result<Self> {
        check_entries(
            "rewards",
            rewards.iter().map(|reward| (reward.id, reward.label.as_str())),
        )?;
        Ok(Self { rewards })
    }

    pub fn list_rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn find_reward(&self, id: RewardId) -> Option<&Reward> {
        self.rewards.iter().find(|reward| reward.id == id)
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self {
            rewards: default_rewards(),
        }
    }
}

fn check_entries<'a>(field: &str, entries: impl Iterator<Item = (u32, &'a str)>) -> Result<()> {
    let mut seen = HashSet::new();
    for (id, text) in entries {
        if !seen.insert(id) {
            return Err(Error::InvalidConfig(format!(
                "{field}: duplicate id {id}"
            )));
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "{field}: entry {id} has an empty description"
            )));
        }
    }
    Ok(())
}

/// Built-in semester task list.
pub fn default_tasks() -> Vec<Task> {
    [
        (1, "Estudar o conteúdo digital por 1h", 4),
        (2, "Baixar o PDF do conteúdo digital e enviar print", 6),
        (3, "Verificar e-mail e responder pesquisa NPS", 4),
        (4, "Enviar print da resposta da pesquisa NPS ou não eleito", 6),
        (5, "Responder a pesquisa ISA", 4),
        (6, "Enviar print da pesquisa ISA concluída", 6),
        (7, "Participar de seletivo de liga da Fisioterapia", 10),
        (8, "Ser aprovado em seletivo de liga da Fisioterapia", 10),
        (9, "Participar de atividades da Atlética Reabilita", 10),
        (
            10,
            "Apresentar banner em eventos institucionais (EIFISIO, FISIO Science ou JAIMP)",
            20,
        ),
        (11, "Aumentar o CR para 9,6 ou mais", 50),
    ]
    .into_iter()
    .map(|(id, title, value)| Task {
        id,
        title: title.to_string(),
        value,
    })
    .collect()
}

/// Built-in reward list.
pub fn default_rewards() -> Vec<Reward> {
    [
        (1, "Certificado digital de destaque", 50),
        (2, "Camisa oficial da Atlética", 100),
        (3, "Kit acadêmico exclusivo", 150),
        (4, "5% de desconto na mensalidade no semestre vigente", 200),
        (5, "10% de desconto na mensalidade no semestre vigente", 250),
        (6, "15% de desconto na mensalidade no semestre vigente", 275),
        (
            7,
            "Bolsa de estudos para curso livre ou inscrição em Congresso de Fisioterapia",
            300,
        ),
    ]
    .into_iter()
    .map(|(id, label, cost)| Reward {
        id,
        label: label.to_string(),
        cost,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogs_keep_declaration_order() {
        let tasks = TaskCatalog::default();
        let ids: Vec<TaskId> = tasks.list_tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());
        let total: u64 = tasks.list_tasks().iter().map(|t| t.value).sum();
        assert_eq!(total, 130);

        let rewards = RewardCatalog::default();
        let costs: Vec<u64> = rewards.list_rewards().iter().map(|r| r.cost).collect();
        assert_eq!(costs, vec![50, 100, 150, 200, 250, 275, 300]);
    }

    #[test]
    fn find_resolves_known_ids_only() {
        let tasks = TaskCatalog::default();
        assert_eq!(tasks.find_task(11).map(|t| t.value), Some(50));
        assert!(tasks.find_task(0).is_none());

        let rewards = RewardCatalog::default();
        assert_eq!(rewards.find_reward(5).map(|r| r.cost), Some(250));
        assert!(rewards.find_reward(8).is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = TaskCatalog::new(vec![
            Task {
                id: 1,
                title: "a".to_string(),
                value: 1,
            },
            Task {
                id: 1,
                title: "b".to_string(),
                value: 2,
            },
        ])
        .expect_err("duplicate id");
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("duplicate id 1")));
    }

    #[test]
    fn blank_label_rejected() {
        let err = RewardCatalog::new(vec![Reward {
            id: 3,
            label: "  ".to_string(),
            cost: 10,
        }])
        .expect_err("blank label");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
