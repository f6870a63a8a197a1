//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    AlreadyInRoomError, ConnectionId, Departure, RepositoryError, Room, RoomId, RoomName,
    Timestamp, Username,
};

/// Room Repository trait（Room Registry）
///
/// ルーム ID から Room へのマップを管理する。
///
/// ## 不変条件
///
/// - メンバーが 0 人のルームは存在しない（最後のメンバーが抜けた操作の中で削除される）
/// - 1 つの接続は同時に高々 1 つのルームにしか所属しない
///
/// 全ての操作は線形化可能でなければならない（途中状態を他の操作から観測できない）。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを作成し、作成者を唯一のメンバーとして登録する
    ///
    /// 作成とメンバー追加を 1 操作で行うため、空のルームが外から見えることはない。
    /// 作成者が既に別のルームに所属している場合は `AlreadyInRoomError` を返す。
    async fn create_room(
        &self,
        name: RoomName,
        creator: ConnectionId,
        username: Username,
        created_at: Timestamp,
    ) -> Result<Room, AlreadyInRoomError>;

    /// Room エンティティを取得
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// メンバーを追加（同じルーム内なら上書き）
    ///
    /// # Errors
    ///
    /// * `RoomNotFound` - ルームが存在しない
    /// * `AlreadyInRoom` - 接続が別のルームに所属している
    async fn add_member(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        username: Username,
    ) -> Result<Room, RepositoryError>;

    /// 接続をルームから外す
    ///
    /// ルームが空になった場合は同じ操作の中でルームを削除する。
    /// どのルームにも所属していなければ `None`。
    async fn remove_member(&self, connection_id: &ConnectionId) -> Option<Departure>;

    /// 接続が所属しているルームの ID を取得
    async fn find_room_of(&self, connection_id: &ConnectionId) -> Option<RoomId>;

    /// 全てのルームを取得
    async fn get_rooms(&self) -> Vec<Room>;

    /// ルーム数を取得
    async fn count_rooms(&self) -> usize;
}
