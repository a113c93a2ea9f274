//! 抽题服务 - 业务能力层
//!
//! 只负责"从一个候选池中抽 n 道题"，不关心专题和配额

use rand::seq::IndexedRandom;
use rand::Rng;

/// 候选池为空但仍需抽题
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPool {
    pub requested: usize,
}

/// 从 `pool` 中抽取恰好 `n` 个元素
///
/// - `n <= pool.len()`: 无放回随机抽样，结果中不会出现同一位置的元素两次
/// - `n > pool.len()`: 先完整取一遍 `pool`（保持原顺序），剩余 `n - pool.len()` 个有放回随机抽取
/// - `pool` 为空且 `n > 0`: 返回 [`EmptyPool`]
///
/// 随机源由调用方注入，测试中使用固定种子即可复现结果
pub fn select<T, R>(pool: &[T], n: usize, rng: &mut R) -> Result<Vec<T>, EmptyPool>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if n == 0 {
        return Ok(Vec::new());
    }
    if pool.is_empty() {
        return Err(EmptyPool { requested: n });
    }

    if n <= pool.len() {
        return Ok(pool.choose_multiple(rng, n).cloned().collect());
    }

    let mut selected = pool.to_vec();
    selected.extend((pool.len()..n).map(|_| pool[rng.random_range(0..pool.len())].clone()));
    Ok(selected)
}
