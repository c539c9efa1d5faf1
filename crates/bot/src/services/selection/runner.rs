use std::sync::Arc;
use std::time::Duration;

use moviepilot::{MediaInfo, MediaKind, SeasonInfo};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::messages::{Responder, SessionOutcome, SessionTurn};
use crate::config::SeasonPolicy;
use crate::services::CatalogClient;

/// 会话所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingChoice,
    AwaitingSeasonChoice,
    Terminal,
}

/// 处理完一个回合后的走向
enum TurnFlow {
    /// 会话继续等待，超时窗口重置
    Continue,
    /// 会话终止
    Done(SessionOutcome),
}

/// 订阅选择会话（Actor 主循环）。
///
/// 同一会话的回合经由 mpsc 串行处理；滚动超时在每个被接受的、未终止
/// 会话的回合后重置为完整窗口。非属主消息被静默忽略，不重置超时。
pub struct SelectionSession {
    owner_id: String,
    candidates: Vec<MediaInfo>,
    phase: Phase,
    selected: Option<MediaInfo>,
    seasons: Vec<SeasonInfo>,
    timeout: Duration,
    policy: SeasonPolicy,
    catalog: Arc<dyn CatalogClient>,
    responder: Arc<dyn Responder>,
    receiver: mpsc::Receiver<SessionTurn>,
}

impl SelectionSession {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        owner_id: String,
        candidates: Vec<MediaInfo>,
        timeout: Duration,
        policy: SeasonPolicy,
        catalog: Arc<dyn CatalogClient>,
        responder: Arc<dyn Responder>,
        receiver: mpsc::Receiver<SessionTurn>,
    ) -> Self {
        debug_assert!(!candidates.is_empty());
        Self {
            owner_id,
            candidates,
            phase: Phase::AwaitingChoice,
            selected: None,
            seasons: Vec::new(),
            timeout,
            policy,
            catalog,
            responder,
            receiver,
        }
    }

    /// 运行会话直至终态
    pub async fn run(mut self) -> SessionOutcome {
        if let Err(e) = self.responder.reply(&self.candidate_list()).await {
            tracing::error!("Failed to send candidate list: {}", e);
            return SessionOutcome::Failed;
        }

        let mut deadline = Instant::now() + self.timeout;

        loop {
            tokio::select! {
                turn = self.receiver.recv() => {
                    let Some(turn) = turn else {
                        // 注册表替换了本会话，通道已关闭
                        tracing::debug!("Session for {} superseded", self.owner_id);
                        return SessionOutcome::Superseded;
                    };

                    // 非属主消息：不回复，不消耗也不重置超时
                    if turn.sender_id != self.owner_id {
                        continue;
                    }

                    match self.process_turn(turn.text.trim()).await {
                        Ok(TurnFlow::Continue) => {
                            deadline = Instant::now() + self.timeout;
                        }
                        Ok(TurnFlow::Done(outcome)) => {
                            self.phase = Phase::Terminal;
                            return outcome;
                        }
                        Err(e) => {
                            tracing::error!(
                                "Error while processing a turn for {}: {}",
                                self.owner_id,
                                e
                            );
                            let _ = self.responder.reply("处理输入时出错，请稍后重试。").await;
                            self.phase = Phase::Terminal;
                            return SessionOutcome::Failed;
                        }
                    }
                }
                _ = sleep_until(deadline) => {
                    // 放弃式终态：静默结束，不再发送任何消息
                    tracing::debug!("Selection session for {} timed out", self.owner_id);
                    self.phase = Phase::Terminal;
                    return SessionOutcome::TimedOut;
                }
            }
        }
    }

    fn candidate_list(&self) -> String {
        let lines: Vec<String> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(i, media)| format!("{}. {}", i + 1, media.display_title()))
            .collect();
        format!(
            "查询到的影片如下\n请直接回复序号进行订阅（回复0退出选择）：\n{}",
            lines.join("\n")
        )
    }

    async fn process_turn(&mut self, text: &str) -> anyhow::Result<TurnFlow> {
        match self.phase {
            Phase::AwaitingChoice => self.handle_choice(text).await,
            Phase::AwaitingSeasonChoice => self.handle_season_choice(text).await,
            // run() 在终态立即返回，不会再走到这里
            Phase::Terminal => Ok(TurnFlow::Done(SessionOutcome::Failed)),
        }
    }

    /// 处理序号选择阶段的输入
    async fn handle_choice(&mut self, text: &str) -> anyhow::Result<TurnFlow> {
        let Ok(index) = text.parse::<i64>() else {
            self.responder.reply("请输入一个数字。").await?;
            return Ok(TurnFlow::Continue);
        };

        if index == 0 {
            self.responder.reply("操作已取消。").await?;
            return Ok(TurnFlow::Done(SessionOutcome::Cancelled));
        }

        if index < 1 || index as usize > self.candidates.len() {
            self.responder.reply("无效的序号，请重新输入。").await?;
            return Ok(TurnFlow::Continue);
        }

        let selected = self.candidates[(index - 1) as usize].clone();
        match selected.kind {
            MediaKind::Movie => self.subscribe_movie(selected).await,
            MediaKind::Series => self.select_series(selected).await,
        }
    }

    async fn subscribe_movie(&mut self, movie: MediaInfo) -> anyhow::Result<TurnFlow> {
        let accepted = self.catalog.subscribe_movie(&movie).await;
        if accepted {
            self.responder
                .reply(&format!(
                    "订阅类型：电影\n订阅影片：{}\n订阅成功！",
                    movie.display_title()
                ))
                .await?;
        } else {
            self.responder.reply("订阅失败。").await?;
        }
        Ok(TurnFlow::Done(SessionOutcome::MovieSubscribed { accepted }))
    }

    async fn select_series(&mut self, series: MediaInfo) -> anyhow::Result<TurnFlow> {
        let seasons = self.catalog.list_seasons(series.tmdb_id).await;
        if seasons.is_empty() {
            self.responder.reply("没有找到可用的季数。").await?;
            return Ok(TurnFlow::Done(SessionOutcome::NoSeasons));
        }

        match self.policy {
            SeasonPolicy::SubscribeAll => self.subscribe_all_seasons(series, seasons).await,
            SeasonPolicy::PromptChoice => {
                let lines: Vec<String> = seasons
                    .iter()
                    .map(|s| {
                        format!("第 {} 季 {}", s.season_number, s.name.as_deref().unwrap_or(""))
                    })
                    .collect();
                self.responder
                    .reply(&format!(
                        "查询到的季如下\n请直接回复季数进行选择（回复0退出选择）：\n{}",
                        lines.join("\n")
                    ))
                    .await?;
                self.selected = Some(series);
                self.seasons = seasons;
                self.phase = Phase::AwaitingSeasonChoice;
                Ok(TurnFlow::Continue)
            }
        }
    }

    /// 批量订阅全部正季，第 0 季（特别篇）不参与尝试也不计入统计
    async fn subscribe_all_seasons(
        &mut self,
        series: MediaInfo,
        seasons: Vec<SeasonInfo>,
    ) -> anyhow::Result<TurnFlow> {
        let mut success = 0usize;
        let mut failed = 0usize;

        for season in seasons.iter().filter(|s| s.season_number > 0) {
            if self.catalog.subscribe_series(&series, season.season_number).await {
                success += 1;
            } else {
                failed += 1;
            }
        }

        self.responder
            .reply(&format!(
                "订阅类型：电视剧\n订阅影片：{}\n订阅结果：成功 {} 季，失败/已订阅 {} 季（共 {} 季）",
                series.display_title(),
                success,
                failed,
                success + failed
            ))
            .await?;
        Ok(TurnFlow::Done(SessionOutcome::SeasonsSubscribed {
            success,
            failed,
        }))
    }

    /// 处理季数选择阶段的输入（prompt_choice 策略）
    async fn handle_season_choice(&mut self, text: &str) -> anyhow::Result<TurnFlow> {
        let Ok(season_number) = text.parse::<i32>() else {
            self.responder.reply("请输入一个有效的季数。").await?;
            return Ok(TurnFlow::Continue);
        };

        // 0 在任何阶段都表示取消
        if season_number == 0 {
            self.responder.reply("操作已取消。").await?;
            return Ok(TurnFlow::Done(SessionOutcome::Cancelled));
        }

        if !self.seasons.iter().any(|s| s.season_number == season_number) {
            self.responder.reply("无效的季数，请重新输入。").await?;
            return Ok(TurnFlow::Continue);
        }

        // AwaitingSeasonChoice 阶段必然带有已选中的剧集
        let series = self
            .selected
            .clone()
            .ok_or_else(|| anyhow::anyhow!("season choice phase without a selected series"))?;

        let accepted = self.catalog.subscribe_series(&series, season_number).await;
        if accepted {
            self.responder
                .reply(&format!(
                    "订阅类型：电视剧\n订阅影片：{}\n订阅第 {} 季成功！",
                    series.display_title(),
                    season_number
                ))
                .await?;
        } else {
            self.responder.reply("订阅失败。").await?;
        }
        Ok(TurnFlow::Done(SessionOutcome::SeasonSubscribed {
            season: season_number,
            accepted,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn movie(title: &str, tmdb_id: i64) -> MediaInfo {
        MediaInfo {
            title: title.to_string(),
            original_title: None,
            year: Some("2021".to_string()),
            tmdb_id,
            kind: MediaKind::Movie,
        }
    }

    fn series(title: &str, tmdb_id: i64) -> MediaInfo {
        MediaInfo {
            title: title.to_string(),
            original_title: None,
            year: Some("2019".to_string()),
            tmdb_id,
            kind: MediaKind::Series,
        }
    }

    fn season(number: i32) -> SeasonInfo {
        SeasonInfo {
            season_number: number,
            name: Some(format!("第 {} 季", number)),
            episode_count: None,
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        seasons: Vec<SeasonInfo>,
        movie_accepted: bool,
        /// Season numbers MoviePilot accepts; everything else fails.
        accepted_seasons: Vec<i32>,
        subscribe_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CatalogClient for FakeCatalog {
        async fn search_title(&self, _title: &str) -> Vec<MediaInfo> {
            Vec::new()
        }

        async fn list_seasons(&self, _tmdb_id: i64) -> Vec<SeasonInfo> {
            self.seasons.clone()
        }

        async fn subscribe_movie(&self, media: &MediaInfo) -> bool {
            self.subscribe_calls.lock().push(format!("movie:{}", media.tmdb_id));
            self.movie_accepted
        }

        async fn subscribe_series(&self, media: &MediaInfo, season: i32) -> bool {
            self.subscribe_calls
                .lock()
                .push(format!("series:{}:{}", media.tmdb_id, season));
            self.accepted_seasons.contains(&season)
        }
    }

    #[derive(Default)]
    struct FakeResponder {
        replies: Mutex<Vec<String>>,
        fail_next: AtomicBool,
    }

    #[async_trait]
    impl Responder for FakeResponder {
        async fn reply(&self, text: &str) -> anyhow::Result<()> {
            if self.fail_next.load(Ordering::SeqCst) {
                anyhow::bail!("send failed");
            }
            self.replies.lock().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        catalog: Arc<FakeCatalog>,
        responder: Arc<FakeResponder>,
        handle: mpsc::Sender<SessionTurn>,
        outcome: tokio::task::JoinHandle<(SessionOutcome, Instant)>,
    }

    fn spawn_session(
        candidates: Vec<MediaInfo>,
        catalog: FakeCatalog,
        policy: SeasonPolicy,
    ) -> Harness {
        let catalog = Arc::new(catalog);
        let responder = Arc::new(FakeResponder::default());
        let (tx, rx) = mpsc::channel(8);
        let session = SelectionSession::new(
            "owner".to_string(),
            candidates,
            Duration::from_secs(60),
            policy,
            Arc::clone(&catalog) as Arc<dyn CatalogClient>,
            Arc::clone(&responder) as Arc<dyn Responder>,
            rx,
        );
        let outcome = tokio::spawn(async move {
            let outcome = session.run().await;
            (outcome, Instant::now())
        });
        Harness {
            catalog,
            responder,
            handle: tx,
            outcome,
        }
    }

    async fn send(harness: &Harness, sender: &str, text: &str) {
        harness
            .handle
            .send(SessionTurn {
                sender_id: sender.to_string(),
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn movie_selection_subscribes_and_terminates() {
        let harness = spawn_session(
            vec![movie("沙丘", 438631), series("庆余年", 94796)],
            FakeCatalog {
                movie_accepted: true,
                ..FakeCatalog::default()
            },
            SeasonPolicy::SubscribeAll,
        );

        send(&harness, "owner", "1").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::MovieSubscribed { accepted: true });
        assert_eq!(
            harness.catalog.subscribe_calls.lock().as_slice(),
            ["movie:438631"]
        );
        let replies = harness.responder.replies.lock();
        assert!(replies[0].contains("1. 沙丘 (2021)"));
        assert!(replies[0].contains("2. 庆余年 (2019)"));
        assert!(replies[1].contains("订阅成功"));
    }

    #[tokio::test]
    async fn zero_cancels_with_exactly_one_cancel_message() {
        let harness = spawn_session(
            vec![movie("沙丘", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        send(&harness, "owner", "0").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::Cancelled);
        let replies = harness.responder.replies.lock();
        let cancels = replies.iter().filter(|r| r.contains("操作已取消")).count();
        assert_eq!(cancels, 1);
        assert!(harness.catalog.subscribe_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn one_based_indexing_selects_the_right_candidate() {
        let harness = spawn_session(
            vec![movie("A", 10), movie("B", 20)],
            FakeCatalog {
                movie_accepted: true,
                ..FakeCatalog::default()
            },
            SeasonPolicy::SubscribeAll,
        );

        // len + 1 is out of range, then 2 selects candidates[1]
        send(&harness, "owner", "3").await;
        send(&harness, "owner", "2").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::MovieSubscribed { accepted: true });
        assert_eq!(
            harness.catalog.subscribe_calls.lock().as_slice(),
            ["movie:20"]
        );
        let replies = harness.responder.replies.lock();
        assert!(replies.iter().any(|r| r.contains("无效的序号")));
    }

    #[tokio::test]
    async fn non_numeric_input_reprompts_and_keeps_session_open() {
        let harness = spawn_session(
            vec![movie("A", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        send(&harness, "owner", "订阅这个").await;
        send(&harness, "owner", "-1").await;
        send(&harness, "owner", "0").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::Cancelled);
        let replies = harness.responder.replies.lock();
        assert!(replies.iter().any(|r| r.contains("请输入一个数字")));
        assert!(replies.iter().any(|r| r.contains("无效的序号")));
    }

    #[tokio::test]
    async fn bulk_subscribe_skips_specials_and_tallies() {
        let harness = spawn_session(
            vec![series("庆余年", 94796)],
            FakeCatalog {
                seasons: vec![season(0), season(1), season(2)],
                // season 1 fails, season 2 succeeds
                accepted_seasons: vec![2],
                ..FakeCatalog::default()
            },
            SeasonPolicy::SubscribeAll,
        );

        send(&harness, "owner", "1").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::SeasonsSubscribed {
                success: 1,
                failed: 1
            }
        );
        // Specials (season 0) were never attempted.
        assert_eq!(
            harness.catalog.subscribe_calls.lock().as_slice(),
            ["series:94796:1", "series:94796:2"]
        );
        let replies = harness.responder.replies.lock();
        assert!(replies
            .last()
            .unwrap()
            .contains("成功 1 季，失败/已订阅 1 季（共 2 季）"));
    }

    #[tokio::test]
    async fn series_without_seasons_terminates() {
        let harness = spawn_session(
            vec![series("无季剧", 7)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        send(&harness, "owner", "1").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::NoSeasons);
        let replies = harness.responder.replies.lock();
        assert!(replies.last().unwrap().contains("没有找到可用的季数"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_a_silent_terminal_outcome() {
        let start = Instant::now();
        let harness = spawn_session(
            vec![movie("A", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        let (outcome, finished) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::TimedOut);
        assert_eq!(finished.duration_since(start), Duration::from_secs(60));
        // Only the initial candidate list was ever sent.
        assert_eq!(harness.responder.replies.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_owner_turns_do_not_reset_the_deadline() {
        let start = Instant::now();
        let harness = spawn_session(
            vec![movie("A", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        send(&harness, "intruder", "1").await;

        let (outcome, finished) = harness.outcome.await.unwrap();

        // Times out at the original deadline, not 30 s later.
        assert_eq!(outcome, SessionOutcome::TimedOut);
        assert_eq!(finished.duration_since(start), Duration::from_secs(60));
        // The intruder got no reply and triggered no subscribe.
        assert_eq!(harness.responder.replies.lock().len(), 1);
        assert!(harness.catalog.subscribe_calls.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_resets_the_timeout_window() {
        let start = Instant::now();
        let harness = spawn_session(
            vec![movie("A", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        tokio::time::sleep(Duration::from_secs(45)).await;
        send(&harness, "owner", "不是数字").await;
        // Past the original 60 s window, but inside the reset one.
        tokio::time::sleep(Duration::from_secs(35)).await;
        send(&harness, "owner", "0").await;

        let (outcome, finished) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert!(finished.duration_since(start) > Duration::from_secs(60));
    }

    #[tokio::test]
    async fn prompt_choice_flow_subscribes_one_season() {
        let harness = spawn_session(
            vec![series("庆余年", 94796)],
            FakeCatalog {
                seasons: vec![season(1), season(2)],
                accepted_seasons: vec![2],
                ..FakeCatalog::default()
            },
            SeasonPolicy::PromptChoice,
        );

        send(&harness, "owner", "1").await;
        send(&harness, "owner", "9").await; // not an offered season
        send(&harness, "owner", "2").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::SeasonSubscribed {
                season: 2,
                accepted: true
            }
        );
        assert_eq!(
            harness.catalog.subscribe_calls.lock().as_slice(),
            ["series:94796:2"]
        );
        let replies = harness.responder.replies.lock();
        assert!(replies.iter().any(|r| r.contains("查询到的季如下")));
        assert!(replies.iter().any(|r| r.contains("无效的季数")));
        assert!(replies.last().unwrap().contains("订阅第 2 季成功"));
    }

    #[tokio::test]
    async fn zero_cancels_in_season_choice_phase_too() {
        let harness = spawn_session(
            vec![series("庆余年", 94796)],
            FakeCatalog {
                seasons: vec![season(1)],
                ..FakeCatalog::default()
            },
            SeasonPolicy::PromptChoice,
        );

        send(&harness, "owner", "1").await;
        send(&harness, "owner", "0").await;
        let (outcome, _) = harness.outcome.await.unwrap();

        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert!(harness.catalog.subscribe_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn turn_error_forces_terminal_state() {
        let harness = spawn_session(
            vec![movie("A", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        // Let the candidate list go out, then make every reply fail.
        tokio::task::yield_now().await;
        harness.responder.fail_next.store(true, Ordering::SeqCst);
        let _ = harness
            .handle
            .send(SessionTurn {
                sender_id: "owner".to_string(),
                text: "不是数字".to_string(),
            })
            .await;

        let (outcome, _) = harness.outcome.await.unwrap();
        assert_eq!(outcome, SessionOutcome::Failed);
    }

    #[tokio::test]
    async fn dropping_the_handle_supersedes_the_session() {
        let harness = spawn_session(
            vec![movie("A", 1)],
            FakeCatalog::default(),
            SeasonPolicy::SubscribeAll,
        );

        drop(harness.handle);
        let (outcome, _) = harness.outcome.await.unwrap();
        assert_eq!(outcome, SessionOutcome::Superseded);
    }
}
