use std::{path::PathBuf, sync::Arc};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// 问题记录：问答库的顶层实体，答案内嵌其中
/// - id 由存储分配（创建顺序递增，从 1 开始）
/// - 其余字段为客户端提供的原样字符串，不做校验
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Question {
    pub id: u64,
    pub title: String,
    pub detail: String,
    pub author: String,
    pub created_at: String,
    pub author_email: String,
    pub answers: Vec<Answer>,
}

/// 答案记录：仅存在于某个问题之下
/// - id 在所属问题内递增，从 1 开始（不是全局唯一）
/// - question_id 由存储回填，不信任客户端输入
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Answer {
    pub id: u64,
    pub content: String,
    pub created_at: String,
    pub author_email: String,
    pub author_name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub question_id: u64,
    #[serde(skip_serializing_if = "is_false")]
    pub is_best: bool,
}

fn is_zero(v: &u64) -> bool { *v == 0 }
fn is_false(v: &bool) -> bool { !*v }

/// JSON file-backed question store.
///
/// Holds the full ordered question collection in memory behind a coarse
/// `RwLock` and persists it to a single pretty-printed JSON array on
/// request. Every operation takes the lock for its whole duration; reads
/// share it, mutations and persistence hold it exclusively enough that a
/// torn collection is never observed.
#[derive(Clone)]
pub struct QaStore {
    inner: Arc<RwLock<Vec<Question>>>,
    file_path: PathBuf,
}

impl QaStore {
    /// Open the store from an existing JSON file.
    ///
    /// 文件缺失或内容不是合法的问题数组时返回 `Load` 错误；
    /// 进程在没有数据文件的情况下拒绝启动。
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        let bytes = fs::read(&file_path)
            .await
            .map_err(|e| ServiceError::Load(format!("{}: {}", file_path.display(), e)))?;
        let questions: Vec<Question> =
            serde_json::from_slice(&bytes).map_err(|e| ServiceError::Load(e.to_string()))?;
        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(questions)), file_path }))
    }

    /// Re-read the bound file and replace the collection.
    ///
    /// The new content is parsed in full before the swap, so a failed
    /// reload leaves the previous collection intact.
    pub async fn reload(&self) -> Result<(), ServiceError> {
        let mut questions = self.inner.write().await;
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::Load(format!("{}: {}", self.file_path.display(), e)))?;
        let parsed: Vec<Question> =
            serde_json::from_slice(&bytes).map_err(|e| ServiceError::Load(e.to_string()))?;
        *questions = parsed;
        Ok(())
    }

    /// Persist the current collection to the bound file, pretty-printed.
    /// In-memory state is unaffected by a failed save.
    pub async fn save(&self) -> Result<(), ServiceError> {
        let questions = self.inner.read().await;
        let data =
            serde_json::to_vec_pretty(&*questions).map_err(|e| ServiceError::Save(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Save(format!("{}: {}", self.file_path.display(), e)))?;
        Ok(())
    }

    /// List the full question collection in insertion order.
    pub async fn list_questions(&self) -> Vec<Question> {
        let questions = self.inner.read().await;
        questions.clone()
    }

    /// Create a question. The payload's id is ignored; the store assigns
    /// the next sequential id and appends at the end.
    pub async fn create_question(&self, input: Question) -> Question {
        let mut questions = self.inner.write().await;
        let mut question = input;
        question.id = questions.len() as u64 + 1;
        // 归一化载荷中附带的答案：编号重排并回填 question_id
        for (idx, answer) in question.answers.iter_mut().enumerate() {
            answer.id = idx as u64 + 1;
            answer.question_id = question.id;
        }
        questions.push(question.clone());
        question
    }

    /// 根据 id 获取问题
    pub async fn get_question(&self, id: u64) -> Result<Question, ServiceError> {
        let questions = self.inner.read().await;
        questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("question"))
    }

    /// Update a question in place, keeping its id and answers.
    pub async fn update_question(&self, id: u64, input: Question) -> Result<Question, ServiceError> {
        let mut questions = self.inner.write().await;
        let existing = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| ServiceError::not_found("question"))?;
        existing.title = input.title;
        existing.detail = input.detail;
        existing.author = input.author;
        existing.author_email = input.author_email;
        existing.created_at = input.created_at;
        Ok(existing.clone())
    }

    /// Append an answer to the question with the given id. The answer id is
    /// sequential within that question and `question_id` is stamped by the
    /// store regardless of what the payload carried.
    pub async fn create_answer(&self, question_id: u64, input: Answer) -> Result<Answer, ServiceError> {
        let mut questions = self.inner.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| ServiceError::not_found("question"))?;
        let mut answer = input;
        answer.id = question.answers.len() as u64 + 1;
        answer.question_id = question_id;
        question.answers.push(answer.clone());
        Ok(answer)
    }

    /// 列出指定问题的全部答案（保持创建顺序）
    pub async fn list_answers(&self, question_id: u64) -> Result<Vec<Answer>, ServiceError> {
        let questions = self.inner.read().await;
        questions
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.answers.clone())
            .ok_or_else(|| ServiceError::not_found("question"))
    }

    /// 获取指定问题下的单个答案
    pub async fn get_answer(&self, question_id: u64, answer_id: u64) -> Result<Answer, ServiceError> {
        let questions = self.inner.read().await;
        let question = questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| ServiceError::not_found("question"))?;
        question
            .answers
            .iter()
            .find(|a| a.id == answer_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("answer"))
    }

    /// Update an answer in place, keeping its id and question back-reference.
    pub async fn update_answer(
        &self,
        question_id: u64,
        answer_id: u64,
        input: Answer,
    ) -> Result<Answer, ServiceError> {
        let mut questions = self.inner.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| ServiceError::not_found("question"))?;
        let answer = question
            .answers
            .iter_mut()
            .find(|a| a.id == answer_id)
            .ok_or_else(|| ServiceError::not_found("answer"))?;
        answer.content = input.content;
        answer.created_at = input.created_at;
        answer.author_email = input.author_email;
        answer.author_name = input.author_name;
        answer.is_best = input.is_best;
        Ok(answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir().join(format!("qa_store_{}.json", uuid::Uuid::new_v4()))
    }

    async fn empty_store() -> (Arc<QaStore>, PathBuf) {
        let path = temp_store_path();
        fs::write(&path, b"[]").await.expect("seed file");
        let store = QaStore::open(&path).await.expect("store init");
        (store, path)
    }

    fn question(title: &str) -> Question {
        Question { title: title.into(), author: "tester".into(), ..Default::default() }
    }

    fn answer(content: &str) -> Answer {
        Answer { content: content.into(), author_name: "tester".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn create_question_assigns_sequential_ids() {
        let (store, path) = empty_store().await;

        let q1 = store.create_question(question("Q1")).await;
        assert_eq!(q1.id, 1);
        assert!(q1.answers.is_empty());

        let q2 = store.create_question(question("Q2")).await;
        assert_eq!(q2.id, 2);

        let all = store.list_questions().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Q1");
        assert_eq!(all[1].title, "Q2");

        assert!(matches!(store.get_question(99).await, Err(ServiceError::NotFound(_))));

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn create_answer_numbers_within_question() {
        let (store, path) = empty_store().await;
        store.create_question(question("Q1")).await;
        store.create_question(question("Q2")).await;

        let a1 = store.create_answer(1, answer("A1")).await.expect("answer 1");
        assert_eq!(a1.id, 1);
        assert_eq!(a1.question_id, 1);

        let a2 = store.create_answer(1, answer("A2")).await.expect("answer 2");
        assert_eq!(a2.id, 2);
        assert_eq!(a2.question_id, 1);

        // 答案编号按问题独立，不是全局唯一
        let b1 = store.create_answer(2, answer("B1")).await.expect("answer on q2");
        assert_eq!(b1.id, 1);
        assert_eq!(b1.question_id, 2);

        let answers = store.list_answers(1).await.expect("list");
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].content, "A1");
        assert_eq!(answers[1].content, "A2");

        let second = store.get_answer(1, 2).await.expect("get");
        assert_eq!(second.content, "A2");

        assert!(matches!(store.get_answer(1, 99).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.get_answer(99, 1).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.list_answers(99).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.create_answer(99, answer("X")).await, Err(ServiceError::NotFound(_))));

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn update_question_applies_fields_and_keeps_answers() {
        let (store, path) = empty_store().await;
        store.create_question(question("before")).await;
        store.create_answer(1, answer("keep me")).await.expect("answer");

        let mut input = question("after");
        input.detail = "new detail".into();
        input.id = 42; // 载荷中的 id 不被采纳
        let updated = store.update_question(1, input).await.expect("update");
        assert_eq!(updated.id, 1);
        assert_eq!(updated.title, "after");
        assert_eq!(updated.detail, "new detail");
        assert_eq!(updated.answers.len(), 1);

        assert!(matches!(
            store.update_question(99, question("x")).await,
            Err(ServiceError::NotFound(_))
        ));

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn update_answer_applies_fields_and_keeps_ids() {
        let (store, path) = empty_store().await;
        store.create_question(question("Q1")).await;
        store.create_answer(1, answer("before")).await.expect("answer");

        let mut input = answer("after");
        input.is_best = true;
        input.question_id = 42; // 回填值不受载荷影响
        let updated = store.update_answer(1, 1, input).await.expect("update");
        assert_eq!(updated.id, 1);
        assert_eq!(updated.question_id, 1);
        assert_eq!(updated.content, "after");
        assert!(updated.is_best);

        assert!(matches!(
            store.update_answer(1, 99, answer("x")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            store.update_answer(99, 1, answer("x")).await,
            Err(ServiceError::NotFound(_))
        ));

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn create_question_normalizes_supplied_answers() {
        let (store, path) = empty_store().await;

        let mut input = question("with answers");
        let mut a = answer("inline");
        a.id = 7;
        a.question_id = 99;
        input.answers.push(a);

        let created = store.create_question(input).await;
        assert_eq!(created.answers[0].id, 1);
        assert_eq!(created.answers[0].question_id, created.id);

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn save_then_open_round_trips() -> Result<(), anyhow::Error> {
        let (store, path) = empty_store().await;
        store.create_question(question("Q1")).await;
        store.create_question(question("Q2")).await;
        store.create_answer(1, answer("A1")).await?;
        store.create_answer(1, answer("A2")).await?;
        store.save().await?;

        let reopened = QaStore::open(&path).await?;
        assert_eq!(reopened.list_questions().await, store.list_questions().await);

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn open_missing_or_invalid_file_is_load_error() {
        let missing = temp_store_path();
        assert!(matches!(QaStore::open(&missing).await, Err(ServiceError::Load(_))));

        let invalid = temp_store_path();
        fs::write(&invalid, b"not json").await.expect("write");
        assert!(matches!(QaStore::open(&invalid).await, Err(ServiceError::Load(_))));
        let _ = fs::remove_file(&invalid).await;
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_state() {
        let (store, path) = empty_store().await;
        store.create_question(question("survivor")).await;

        fs::write(&path, b"{broken").await.expect("corrupt file");
        assert!(matches!(store.reload().await, Err(ServiceError::Load(_))));
        assert_eq!(store.list_questions().await.len(), 1);

        // 文件恢复后 reload 正常替换集合
        fs::write(&path, b"[]").await.expect("restore file");
        store.reload().await.expect("reload");
        assert!(store.list_questions().await.is_empty());

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn failed_save_keeps_memory_intact() {
        let (store, path) = empty_store().await;
        store.create_question(question("still here")).await;

        // 将目标路径替换为目录，使写入必然失败
        fs::remove_file(&path).await.expect("remove");
        fs::create_dir(&path).await.expect("dir");
        assert!(matches!(store.save().await, Err(ServiceError::Save(_))));
        assert_eq!(store.list_questions().await.len(), 1);

        let _ = fs::remove_dir(&path).await;
    }

    #[test]
    fn answer_wire_shape_omits_defaults() {
        let bare = Answer { content: "A".into(), ..Default::default() };
        let json = serde_json::to_string(&bare).expect("serialize");
        assert!(!json.contains("question_id"));
        assert!(!json.contains("is_best"));

        let full = Answer { question_id: 1, is_best: true, ..bare };
        let json = serde_json::to_string(&full).expect("serialize");
        assert!(json.contains("\"question_id\":1"));
        assert!(json.contains("\"is_best\":true"));
    }
}
