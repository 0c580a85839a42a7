//! 위치 플레이스홀더 번호 조정
//!
//! WHERE와 SET처럼 서로 독립적으로 생성되는 조각들이 한 문장 안에서 번호를
//! 재사용하거나 건너뛰지 않으려면, 각 조각이 시작할 번호를 누군가 이어서
//! 계산해 줘야 합니다. 잘못된 시작 번호는 문법 오류가 아니라 *엉뚱한 값이
//! 엉뚱한 자리에 바인딩되는* 문장을 만들어 냅니다.

/// 플레이스홀더 커서
///
/// 값을 바인딩할 수 있는 조각을 생성하기 직전에 `base()`로 시작 번호를 얻고,
/// 조각이 실제로 바인딩한 값 개수만큼 `advance()`합니다.
#[derive(Debug, Default)]
pub struct PlaceholderCursor {
    consumed: usize,
}

impl PlaceholderCursor {
    pub fn new() -> Self {
        Self { consumed: 0 }
    }

    /// 문장 앞쪽에 고정 값이 이미 있는 경우 (예: database/schema 선행 값)
    pub fn starting_after(consumed: usize) -> Self {
        Self { consumed }
    }

    /// 다음 조각이 번호를 시작할 위치 (= 소비된 값 개수 + 1)
    pub fn base(&self) -> usize {
        self.consumed + 1
    }

    /// 조각이 바인딩한 값 개수 반영
    pub fn advance(&mut self, bound: usize) {
        self.consumed += bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_starts_at_one() {
        assert_eq!(PlaceholderCursor::new().base(), 1);
    }

    #[test]
    fn test_base_follows_consumed_values() {
        let mut cursor = PlaceholderCursor::new();
        cursor.advance(3);
        assert_eq!(cursor.base(), 4);
        cursor.advance(0);
        assert_eq!(cursor.base(), 4);
        cursor.advance(2);
        assert_eq!(cursor.base(), 6);
    }

    #[test]
    fn test_starting_after_leading_values() {
        // database/schema 두 값이 선행하는 문장은 3번부터 시작합니다.
        let cursor = PlaceholderCursor::starting_after(2);
        assert_eq!(cursor.base(), 3);
    }
}
