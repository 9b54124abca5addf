use std::sync::Arc;

use relay_core::{
    DictionaryIndex, FixedStartWord, GameRound, IdentityService, RoundPolicy, ScoreLedger,
};
use relay_store::{MemoryStore, SharedStore};

/// Builds a dictionary from the partition file format, covering the chain
/// 시작 -> 작은 -> 은하수 -> 수박, plus the winning word 은잠.
pub fn create_test_dictionary() -> DictionaryIndex {
    let mut dictionary = DictionaryIndex::new();
    dictionary.load_partition_text("dict_j", "작은\t크기가 보통에 미치지 못한\n");
    dictionary.load_partition_text("dict_ng", "은하수\t밤하늘의 별 무리\n은잠\t은으로 만든 비녀\t!\n");
    dictionary.load_partition_text("dict_s", "수박\t여름 과일\n");
    dictionary
}

pub fn create_shared_store() -> Arc<dyn SharedStore> {
    Arc::new(MemoryStore::new())
}

/// One coordinator instance over the given store, as a clustered deployment
/// would run several of.
pub fn create_round_on(store: Arc<dyn SharedStore>, policy: RoundPolicy) -> GameRound {
    let start_word = policy.start_word.clone();
    GameRound::new(
        store.clone(),
        Arc::new(create_test_dictionary()),
        ScoreLedger::new(store),
        Arc::new(FixedStartWord(start_word)),
        policy,
    )
}

pub fn create_round(store: Arc<dyn SharedStore>) -> GameRound {
    create_round_on(store, RoundPolicy::default())
}

pub fn create_identity_service(store: Arc<dyn SharedStore>) -> IdentityService {
    IdentityService::new(store.clone(), ScoreLedger::new(store))
}
