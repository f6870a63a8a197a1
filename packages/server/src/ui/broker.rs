//! Broker: inbound frame protocol and fan-out.
//!
//! 接続ごとの状態は Room Registry のメンバー情報から決まる。
//!
//! ```text
//! Unassigned --create-room / join-room--> InRoom --disconnect--> Closed
//!      └──────────────────disconnect──────────────────────────────┘
//! ```
//!
//! イベント処理は `dispatch` ロックで直列化する。レジストリの更新と送信キューへの
//! push を同じロック区間で行うため、同じルームの全メンバーが同じ順序でメッセージを受け取る。

use std::sync::Arc;

use hiroba_shared::time::Clock;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, MessagePusher, MessageText, PusherChannel, RoomName, RoomRepository,
        Username,
    },
    infrastructure::dto::websocket::{
        ChatMessageDto, ClientFrame, ErrorMessage, RoomCreatedMessage, RoomJoinedMessage,
        UserJoinedMessage, UserLeftMessage,
    },
    usecase::{
        ConnectParticipantUseCase, CreateRoomError, CreateRoomUseCase,
        DisconnectParticipantUseCase, JoinRoomError, JoinRoomUseCase, SendMessageUseCase,
    },
};

const ROOM_NOT_FOUND: &str = "Room not found";
const ALREADY_IN_ROOM: &str = "Already in a room";

/// Chat broker
///
/// Owns the use cases (and through them both registries). One instance is built at
/// startup and shared by every connection handler.
pub struct Broker {
    connect_participant_usecase: ConnectParticipantUseCase,
    create_room_usecase: CreateRoomUseCase,
    join_room_usecase: JoinRoomUseCase,
    send_message_usecase: SendMessageUseCase,
    disconnect_participant_usecase: DisconnectParticipantUseCase,
    /// MessagePusher（返信とブロードキャストに使う）
    message_pusher: Arc<dyn MessagePusher>,
    dispatch: Mutex<()>,
}

impl Broker {
    /// Create a broker over the given registries
    ///
    /// # Arguments
    ///
    /// * `repository` - Room Registry
    /// * `message_pusher` - Connection Registry
    /// * `clock` - Clock used for room creation and message timestamps
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connect_participant_usecase: ConnectParticipantUseCase::new(message_pusher.clone()),
            create_room_usecase: CreateRoomUseCase::new(repository.clone(), clock.clone()),
            join_room_usecase: JoinRoomUseCase::new(repository.clone()),
            send_message_usecase: SendMessageUseCase::new(repository.clone(), clock),
            disconnect_participant_usecase: DisconnectParticipantUseCase::new(
                repository,
                message_pusher.clone(),
            ),
            message_pusher,
            dispatch: Mutex::new(()),
        }
    }

    /// Register a freshly accepted connection. The connection starts unassigned.
    pub async fn connect(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = self.connect_participant_usecase.execute(sender).await;
        tracing::info!("Connection '{}' accepted", connection_id);
        connection_id
    }

    /// Decode and process one inbound text frame.
    ///
    /// Malformed frames are dropped with a warning; the connection keeps working.
    pub async fn handle_frame(&self, connection_id: &ConnectionId, text: &str) {
        match ClientFrame::decode(text) {
            Ok(frame) => self.handle_event(connection_id, frame).await,
            Err(e) => {
                tracing::warn!(
                    "Dropping malformed frame from '{}': {} ({})",
                    connection_id,
                    e,
                    text
                );
            }
        }
    }

    /// Process one decoded event.
    pub async fn handle_event(&self, connection_id: &ConnectionId, frame: ClientFrame) {
        let _guard = self.dispatch.lock().await;

        // 切断済み（Closed）の接続からのイベントは捨てる
        if self.message_pusher.lookup(connection_id).await.is_none() {
            tracing::debug!("Dropping event from closed connection '{}'", connection_id);
            return;
        }

        match frame {
            ClientFrame::CreateRoom {
                room_name,
                username,
            } => {
                self.create_room(connection_id, room_name, username).await;
            }
            ClientFrame::JoinRoom { room_id, username } => {
                self.join_room(connection_id, room_id, username).await;
            }
            ClientFrame::ChatMessage { text } => {
                self.chat_message(connection_id, text).await;
            }
        }
    }

    /// Handle transport close: leave the room, notify the remaining members, retire the id.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let _guard = self.dispatch.lock().await;

        let Some(departure) = self
            .disconnect_participant_usecase
            .execute(connection_id)
            .await
        else {
            tracing::info!("Connection '{}' closed (not in a room)", connection_id);
            return;
        };

        if departure.room_deleted() {
            tracing::info!(
                "'{}' left room '{}'; room deleted",
                departure.username,
                departure.room_id
            );
            return;
        }

        tracing::info!(
            "'{}' left room '{}' ({} remaining)",
            departure.username,
            departure.room_id,
            departure.remaining_members.len()
        );
        self.broadcast_frame(
            departure.remaining_members,
            &UserLeftMessage::new(&departure.username),
        )
        .await;
    }

    async fn create_room(&self, connection_id: &ConnectionId, room_name: String, username: String) {
        match self
            .create_room_usecase
            .execute(
                connection_id.clone(),
                RoomName::new(room_name),
                Username::new(username),
            )
            .await
        {
            Ok(room) => {
                tracing::info!(
                    "Room '{}' ({}) created by '{}'",
                    room.id,
                    room.name.as_str(),
                    connection_id
                );
                self.send_frame(connection_id, &RoomCreatedMessage::from(&room))
                    .await;
            }
            Err(CreateRoomError::AlreadyInRoom(room_id)) => {
                tracing::warn!(
                    "'{}' tried to create a room while in room '{}'",
                    connection_id,
                    room_id
                );
                self.send_frame(connection_id, &ErrorMessage::new(ALREADY_IN_ROOM))
                    .await;
            }
        }
    }

    async fn join_room(&self, connection_id: &ConnectionId, room_id: String, username: String) {
        let username = Username::new(username);
        match self
            .join_room_usecase
            .execute(connection_id.clone(), room_id, username.clone())
            .await
        {
            Ok(joined) => {
                tracing::info!(
                    "'{}' joined room '{}' as '{}'",
                    connection_id,
                    joined.room.id,
                    username
                );
                self.send_frame(connection_id, &RoomJoinedMessage::from(&joined.room))
                    .await;
                self.broadcast_frame(joined.notify_targets, &UserJoinedMessage::new(&username))
                    .await;
            }
            Err(JoinRoomError::RoomNotFound(room_id)) => {
                tracing::info!("'{}' tried to join unknown room '{}'", connection_id, room_id);
                self.send_frame(connection_id, &ErrorMessage::new(ROOM_NOT_FOUND))
                    .await;
            }
            Err(JoinRoomError::AlreadyInRoom(room_id)) => {
                tracing::warn!(
                    "'{}' tried to join a room while in room '{}'",
                    connection_id,
                    room_id
                );
                self.send_frame(connection_id, &ErrorMessage::new(ALREADY_IN_ROOM))
                    .await;
            }
        }
    }

    async fn chat_message(&self, connection_id: &ConnectionId, text: String) {
        let Some(delivery) = self
            .send_message_usecase
            .execute(connection_id, MessageText::new(text))
            .await
        else {
            tracing::debug!("Ignoring chat message from '{}' (not in a room)", connection_id);
            return;
        };

        tracing::debug!(
            "Broadcasting message '{}' from '{}' to {} members",
            delivery.message.id.as_str(),
            delivery.message.sender,
            delivery.targets.len()
        );
        self.broadcast_frame(delivery.targets, &ChatMessageDto::from(&delivery.message))
            .await;
    }

    async fn send_frame<T: Serialize>(&self, connection_id: &ConnectionId, frame: &T) {
        let Some(json) = encode(frame) else {
            return;
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &json).await {
            tracing::debug!("Reply to '{}' not delivered: {}", connection_id, e);
        }
    }

    async fn broadcast_frame<T: Serialize>(&self, targets: Vec<ConnectionId>, frame: &T) {
        if targets.is_empty() {
            return;
        }
        if let Some(json) = encode(frame) {
            self.message_pusher.broadcast(targets, &json).await;
        }
    }
}

fn encode<T: Serialize>(frame: &T) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to encode outbound frame: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OUTBOUND_QUEUE_CAPACITY;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
    };
    use hiroba_shared::time::{MonotonicClock, SystemClock};
    use serde_json::Value;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - Broker のイベントプロトコル（create / join / chat / disconnect）
    // - 各イベントで誰にどのフレームが届くか
    //
    // 【どのようなシナリオをテストするか】
    // 1. Lobby シナリオ（作成 → 参加 → 発言 → 退出 → 退出）
    // 2. 存在しないルームへの参加
    // 3. 所属中の create / join の拒否
    // 4. 未所属の接続からのチャット、不正なフレーム
    // 5. N 人のルームでの配送数とメッセージ ID の一意性
    // ========================================

    struct TestClient {
        id: ConnectionId,
        rx: mpsc::Receiver<String>,
    }

    impl TestClient {
        /// 受信済みのフレームを全て取り出す
        fn drain(&mut self) -> Vec<Value> {
            let mut frames = Vec::new();
            while let Ok(text) = self.rx.try_recv() {
                frames.push(serde_json::from_str(&text).unwrap());
            }
            frames
        }
    }

    fn create_test_broker() -> (Broker, Arc<InMemoryRoomRepository>) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let broker = Broker::new(
            repository.clone(),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(MonotonicClock::new(SystemClock)),
        );
        (broker, repository)
    }

    async fn connect(broker: &Broker) -> TestClient {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let id = broker.connect(tx).await;
        TestClient { id, rx }
    }

    async fn send(broker: &Broker, client: &TestClient, frame: Value) {
        broker.handle_frame(&client.id, &frame.to_string()).await;
    }

    async fn create_room(broker: &Broker, client: &mut TestClient, name: &str, user: &str) -> String {
        send(
            broker,
            client,
            serde_json::json!({"type": "create-room", "roomName": name, "username": user}),
        )
        .await;
        let frames = client.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "room-created");
        frames[0]["roomId"].as_str().unwrap().to_string()
    }

    async fn join_room(broker: &Broker, client: &TestClient, room_id: &str, user: &str) {
        send(
            broker,
            client,
            serde_json::json!({"type": "join-room", "roomId": room_id, "username": user}),
        )
        .await;
    }

    #[tokio::test]
    async fn test_lobby_scenario() {
        // テスト項目: 作成 → 参加 → 発言 → 退出 → 退出 の一連の流れ
        // given (前提条件):
        let (broker, repository) = create_test_broker();
        let mut alice = connect(&broker).await;
        let mut bob = connect(&broker).await;

        // when (操作): alice が Lobby を作成
        send(
            &broker,
            &alice,
            serde_json::json!({"type": "create-room", "roomName": "Lobby", "username": "alice"}),
        )
        .await;

        // then (期待する結果):
        let frames = alice.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "room-created");
        assert_eq!(frames[0]["roomName"], "Lobby");
        let room_id = frames[0]["roomId"].as_str().unwrap().to_string();

        // when (操作): bob が参加
        join_room(&broker, &bob, &room_id, "bob").await;

        // then (期待する結果):
        assert_eq!(
            bob.drain(),
            vec![serde_json::json!({"type": "room-joined", "roomId": room_id, "roomName": "Lobby"})]
        );
        assert_eq!(
            alice.drain(),
            vec![serde_json::json!({"type": "user-joined", "username": "bob"})]
        );

        // when (操作): alice が発言
        send(
            &broker,
            &alice,
            serde_json::json!({"type": "chat-message", "text": "hi"}),
        )
        .await;

        // then (期待する結果): 送信者を含む両者に同じメッセージが届く
        let to_alice = alice.drain();
        let to_bob = bob.drain();
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice, to_bob);
        assert_eq!(to_alice[0]["type"], "chat-message");
        assert_eq!(to_alice[0]["sender"], "alice");
        assert_eq!(to_alice[0]["text"], "hi");
        assert!(to_alice[0]["id"].is_string());
        assert!(to_alice[0]["timestamp"].is_i64());

        // when (操作): bob が切断
        broker.disconnect(&bob.id).await;

        // then (期待する結果):
        assert_eq!(
            alice.drain(),
            vec![serde_json::json!({"type": "user-left", "username": "bob"})]
        );
        assert_eq!(repository.count_rooms().await, 1);

        // when (操作): alice が切断
        broker.disconnect(&alice.id).await;

        // then (期待する結果): ルームが削除される
        assert_eq!(repository.count_rooms().await, 0);
        let mut carol = connect(&broker).await;
        join_room(&broker, &carol, &room_id, "carol").await;
        assert_eq!(
            carol.drain(),
            vec![serde_json::json!({"type": "error", "message": "Room not found"})]
        );
    }

    #[tokio::test]
    async fn test_join_unknown_room_reports_error_and_allows_retry() {
        // テスト項目: 存在しないルームへの参加はエラーが返り、その後の参加は成功する
        // given (前提条件):
        let (broker, _repository) = create_test_broker();
        let mut alice = connect(&broker).await;
        let mut bob = connect(&broker).await;
        let room_id = create_room(&broker, &mut alice, "Lobby", "alice").await;

        // when (操作):
        join_room(&broker, &bob, "does-not-exist", "bob").await;

        // then (期待する結果):
        assert_eq!(
            bob.drain(),
            vec![serde_json::json!({"type": "error", "message": "Room not found"})]
        );
        assert!(alice.drain().is_empty());

        // when (操作): 正しい ID で再試行
        join_room(&broker, &bob, &room_id, "bob").await;

        // then (期待する結果):
        assert_eq!(bob.drain()[0]["type"], "room-joined");
    }

    #[tokio::test]
    async fn test_create_or_join_while_in_room_is_rejected() {
        // テスト項目: ルーム所属中の create / join はエラーになり、状態は変わらない
        // given (前提条件):
        let (broker, repository) = create_test_broker();
        let mut alice = connect(&broker).await;
        let mut bob = connect(&broker).await;
        let lobby = create_room(&broker, &mut alice, "Lobby", "alice").await;
        let other = create_room(&broker, &mut bob, "Other", "bob").await;

        // when (操作):
        send(
            &broker,
            &alice,
            serde_json::json!({"type": "create-room", "roomName": "Second", "username": "alice"}),
        )
        .await;
        join_room(&broker, &alice, &other, "alice").await;

        // then (期待する結果):
        let error = serde_json::json!({"type": "error", "message": "Already in a room"});
        assert_eq!(alice.drain(), vec![error.clone(), error]);
        assert!(bob.drain().is_empty());
        assert_eq!(repository.count_rooms().await, 2);
        assert_eq!(
            repository.find_room_of(&alice.id).await.map(|id| id.into_string()),
            Some(lobby)
        );
    }

    #[tokio::test]
    async fn test_chat_message_without_room_is_ignored() {
        // テスト項目: 未所属の接続からのチャットは誰にも届かず、エラーも返らない
        // given (前提条件):
        let (broker, _repository) = create_test_broker();
        let mut alice = connect(&broker).await;
        let mut bob = connect(&broker).await;
        create_room(&broker, &mut alice, "Lobby", "alice").await;

        // when (操作):
        send(
            &broker,
            &bob,
            serde_json::json!({"type": "chat-message", "text": "anyone?"}),
        )
        .await;

        // then (期待する結果):
        assert!(alice.drain().is_empty());
        assert!(bob.drain().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        // テスト項目: 不正なフレームは破棄され、その後のフレームは通常通り処理される
        // given (前提条件):
        let (broker, repository) = create_test_broker();
        let mut alice = connect(&broker).await;

        // when (操作):
        broker.handle_frame(&alice.id, "not json").await;
        broker
            .handle_frame(&alice.id, r#"{"type":"join-room","username":"alice"}"#)
            .await;
        broker
            .handle_frame(&alice.id, r#"{"type":"dance","moves":3}"#)
            .await;

        // then (期待する結果):
        assert!(alice.drain().is_empty());
        assert_eq!(repository.count_rooms().await, 0);
        create_room(&broker, &mut alice, "Lobby", "alice").await;
    }

    #[tokio::test]
    async fn test_chat_delivers_once_to_each_of_n_members() {
        // テスト項目: N 人のルームで 1 回の発言が各メンバーにちょうど 1 回届く
        // given (前提条件):
        let (broker, _repository) = create_test_broker();
        let mut host = connect(&broker).await;
        let room_id = create_room(&broker, &mut host, "Lobby", "host").await;
        let mut guests = Vec::new();
        for i in 0..4 {
            let guest = connect(&broker).await;
            join_room(&broker, &guest, &room_id, &format!("guest-{i}")).await;
            guests.push(guest);
        }
        host.drain();
        for guest in &mut guests {
            guest.drain();
        }

        // when (操作): guest-2 が 2 回発言
        for text in ["one", "two"] {
            send(
                &broker,
                &guests[2],
                serde_json::json!({"type": "chat-message", "text": text}),
            )
            .await;
        }

        // then (期待する結果):
        let mut all = vec![host.drain()];
        all.extend(guests.iter_mut().map(TestClient::drain));
        for frames in &all {
            assert_eq!(frames.len(), 2);
            assert_eq!(frames[0]["text"], "one");
            assert_eq!(frames[1]["text"], "two");
            assert_eq!(frames[0]["sender"], "guest-2");
            assert_ne!(frames[0]["id"], frames[1]["id"]);
            assert!(frames[0]["timestamp"].as_i64() <= frames[1]["timestamp"].as_i64());
        }
        assert!(all.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_disconnect_one_of_many_notifies_each_remaining_member_once() {
        // テスト項目: M 人中 1 人の切断で残り M-1 人に user-left が 1 回ずつ届き、ルームは参加可能なまま
        // given (前提条件):
        let (broker, _repository) = create_test_broker();
        let mut host = connect(&broker).await;
        let room_id = create_room(&broker, &mut host, "Lobby", "host").await;
        let mut members = vec![host];
        for name in ["bob", "carol"] {
            let member = connect(&broker).await;
            join_room(&broker, &member, &room_id, name).await;
            members.push(member);
        }
        for member in &mut members {
            member.drain();
        }
        let leaving = members.remove(1);

        // when (操作):
        broker.disconnect(&leaving.id).await;

        // then (期待する結果):
        for member in &mut members {
            assert_eq!(
                member.drain(),
                vec![serde_json::json!({"type": "user-left", "username": "bob"})]
            );
        }
        let mut dave = connect(&broker).await;
        join_room(&broker, &dave, &room_id, "dave").await;
        assert_eq!(dave.drain()[0]["type"], "room-joined");
    }

    #[tokio::test]
    async fn test_events_after_disconnect_are_ignored() {
        // テスト項目: 切断済みの接続から届いた create / join / chat は無視される
        // given (前提条件):
        let (broker, repository) = create_test_broker();
        let mut alice = connect(&broker).await;
        let room_id = create_room(&broker, &mut alice, "Lobby", "alice").await;
        let mut ghost = connect(&broker).await;
        broker.disconnect(&ghost.id).await;

        // when (操作):
        send(
            &broker,
            &ghost,
            serde_json::json!({"type": "create-room", "roomName": "Ghost", "username": "ghost"}),
        )
        .await;
        join_room(&broker, &ghost, &room_id, "ghost").await;
        send(
            &broker,
            &ghost,
            serde_json::json!({"type": "chat-message", "text": "boo"}),
        )
        .await;

        // then (期待する結果): ルームもメンバーも増えず、誰にも何も届かない
        assert_eq!(repository.count_rooms().await, 1);
        assert_eq!(repository.find_room_of(&ghost.id).await, None);
        assert!(alice.drain().is_empty());
        assert!(ghost.drain().is_empty());

        // when (操作): alice が切断
        broker.disconnect(&alice.id).await;

        // then (期待する結果): 最後のメンバーが抜けたルームは削除される
        assert_eq!(repository.count_rooms().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_safe() {
        // テスト項目: 同じ接続の二重切断は何も起こさない
        // given (前提条件):
        let (broker, repository) = create_test_broker();
        let mut alice = connect(&broker).await;
        let mut bob = connect(&broker).await;
        let room_id = create_room(&broker, &mut alice, "Lobby", "alice").await;
        join_room(&broker, &bob, &room_id, "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        broker.disconnect(&bob.id).await;
        broker.disconnect(&bob.id).await;

        // then (期待する結果):
        assert_eq!(alice.drain().len(), 1);
        assert_eq!(repository.count_rooms().await, 1);
    }
}
