use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// 数值子索引的键类型。键一律是 8 字节 little-endian 原始编码，
/// 比较时按类型解码后再比（浮点用 total order，避免 NaN 破坏树序）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumKind {
    Uint64,
    Int64,
    Double,
}

impl NumKind {
    pub const KEY_LEN: usize = 8;

    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let ka = key8(a);
        let kb = key8(b);
        match self {
            NumKind::Uint64 => u64::from_le_bytes(ka).cmp(&u64::from_le_bytes(kb)),
            NumKind::Int64 => i64::from_le_bytes(ka).cmp(&i64::from_le_bytes(kb)),
            NumKind::Double => f64::from_le_bytes(ka).total_cmp(&f64::from_le_bytes(kb)),
        }
    }
}

fn key8(b: &[u8]) -> [u8; 8] {
    b.try_into().expect("numeric index key must be 8 bytes")
}

/// 遍历回调的裁决。Delete 变体要求遍历器在不漏访、不重访其余节点的
/// 前提下摘除当前节点。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkAction {
    Continue,
    Stop,
    DeleteAndContinue,
    DeleteAndStop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

const NIL: usize = usize::MAX;

#[derive(Clone, Debug)]
struct Node<V> {
    key: [u8; 8],
    value: V,
    color: Color,
    left: usize,
    right: usize,
    parent: usize,
}

/// 红黑树有序 map。arena 存储（Vec + free list），节点间用下标链接。
///
/// 经典不变量：根黑、无红红父子边、任意根到空叶路径黑高相等。
/// `check_invariants` 直接可测这三条。
#[derive(Clone, Debug)]
pub struct RbTree<V> {
    kind: NumKind,
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    root: usize,
    len: usize,
}

impl<V> RbTree<V> {
    pub fn new(kind: NumKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            free: Vec::new(),
            root: NIL,
            len: 0,
        }
    }

    pub fn kind(&self) -> NumKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, i: usize) -> &Node<V> {
        self.nodes[i].as_ref().expect("linked index must be live")
    }

    fn node_mut(&mut self, i: usize) -> &mut Node<V> {
        self.nodes[i].as_mut().expect("linked index must be live")
    }

    fn left(&self, i: usize) -> usize {
        if i == NIL {
            NIL
        } else {
            self.node(i).left
        }
    }

    fn right(&self, i: usize) -> usize {
        if i == NIL {
            NIL
        } else {
            self.node(i).right
        }
    }

    fn parent(&self, i: usize) -> usize {
        if i == NIL {
            NIL
        } else {
            self.node(i).parent
        }
    }

    // 空叶视为黑：红黑不变量的标准约定
    fn color(&self, i: usize) -> Color {
        if i == NIL {
            Color::Black
        } else {
            self.node(i).color
        }
    }

    fn set_color(&mut self, i: usize, c: Color) {
        if i != NIL {
            self.node_mut(i).color = c;
        }
    }

    fn set_parent(&mut self, i: usize, p: usize) {
        if i != NIL {
            self.node_mut(i).parent = p;
        }
    }

    fn alloc(&mut self, key: [u8; 8], value: V) -> usize {
        let node = Node {
            key,
            value,
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent: NIL,
        };
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                i
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn dealloc(&mut self, i: usize) -> V {
        let node = self.nodes[i].take().expect("linked index must be live");
        self.free.push(i);
        node.value
    }

    fn find_node(&self, key: &[u8]) -> usize {
        let mut cur = self.root;
        while cur != NIL {
            match self.kind.compare(key, &self.node(cur).key) {
                Ordering::Less => cur = self.node(cur).left,
                Ordering::Greater => cur = self.node(cur).right,
                Ordering::Equal => return cur,
            }
        }
        NIL
    }

    pub fn find(&self, key: &[u8]) -> Option<&V> {
        let i = self.find_node(key);
        if i == NIL {
            None
        } else {
            Some(&self.node(i).value)
        }
    }

    pub fn find_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let i = self.find_node(key);
        if i == NIL {
            None
        } else {
            Some(&mut self.node_mut(i).value)
        }
    }

    /// 插入或覆盖。返回 true 表示新键。
    pub fn add(&mut self, key: &[u8], value: V) -> bool {
        let k = key8(key);
        let mut parent = NIL;
        let mut cur = self.root;
        while cur != NIL {
            parent = cur;
            match self.kind.compare(&k, &self.node(cur).key) {
                Ordering::Less => cur = self.node(cur).left,
                Ordering::Greater => cur = self.node(cur).right,
                Ordering::Equal => {
                    self.node_mut(cur).value = value;
                    return false;
                }
            }
        }

        let z = self.alloc(k, value);
        self.node_mut(z).parent = parent;
        if parent == NIL {
            self.root = z;
        } else if self.kind.compare(&k, &self.node(parent).key) == Ordering::Less {
            self.node_mut(parent).left = z;
        } else {
            self.node_mut(parent).right = z;
        }
        self.len += 1;
        self.insert_fixup(z);
        true
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let z = self.find_node(key);
        if z == NIL {
            None
        } else {
            Some(self.remove_node(z))
        }
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.right(x);
        let y_left = self.left(y);
        self.node_mut(x).right = y_left;
        self.set_parent(y_left, x);

        let xp = self.parent(x);
        self.node_mut(y).parent = xp;
        if xp == NIL {
            self.root = y;
        } else if self.left(xp) == x {
            self.node_mut(xp).left = y;
        } else {
            self.node_mut(xp).right = y;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.left(x);
        let y_right = self.right(y);
        self.node_mut(x).left = y_right;
        self.set_parent(y_right, x);

        let xp = self.parent(x);
        self.node_mut(y).parent = xp;
        if xp == NIL {
            self.root = y;
        } else if self.left(xp) == x {
            self.node_mut(xp).left = y;
        } else {
            self.node_mut(xp).right = y;
        }
        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;
    }

    fn insert_fixup(&mut self, mut z: usize) {
        // 根的父是 NIL（黑），循环自然停在根
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            if g == NIL {
                break;
            }
            if p == self.left(g) {
                let u = self.right(g);
                if self.color(u) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(u, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p2 = self.parent(z);
                    let g2 = self.parent(p2);
                    self.set_color(p2, Color::Black);
                    self.set_color(g2, Color::Red);
                    self.rotate_right(g2);
                }
            } else {
                let u = self.left(g);
                if self.color(u) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(u, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p2 = self.parent(z);
                    let g2 = self.parent(p2);
                    self.set_color(p2, Color::Black);
                    self.set_color(g2, Color::Red);
                    self.rotate_left(g2);
                }
            }
        }
        let r = self.root;
        self.set_color(r, Color::Black);
    }

    fn minimum(&self, mut x: usize) -> usize {
        while self.left(x) != NIL {
            x = self.left(x);
        }
        x
    }

    // 用 v 顶替 u 的位置（只接父链，不动 v 的子树）
    fn transplant(&mut self, u: usize, v: usize) {
        let up = self.parent(u);
        if up == NIL {
            self.root = v;
        } else if self.left(up) == u {
            self.node_mut(up).left = v;
        } else {
            self.node_mut(up).right = v;
        }
        self.set_parent(v, up);
    }

    fn remove_node(&mut self, z: usize) -> V {
        let mut y_color = self.color(z);
        let x;
        let x_parent;

        if self.left(z) == NIL {
            x = self.right(z);
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else if self.right(z) == NIL {
            x = self.left(z);
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else {
            // 双子节点：用右子树最小值 y 顶替 z
            let y = self.minimum(self.right(z));
            y_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                x_parent = y;
            } else {
                x_parent = self.parent(y);
                self.transplant(y, x);
                let zr = self.right(z);
                self.node_mut(y).right = zr;
                self.set_parent(zr, y);
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.node_mut(y).left = zl;
            self.set_parent(zl, y);
            let zc = self.color(z);
            self.set_color(y, zc);
        }

        self.len -= 1;
        let value = self.dealloc(z);
        if y_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
        value
    }

    // x 可能是 NIL，父位置单独携带（arena 无哨兵节点）
    fn delete_fixup(&mut self, mut x: usize, mut x_parent: usize) {
        while x != self.root && self.color(x) == Color::Black {
            if x_parent == NIL {
                break;
            }
            if x == self.left(x_parent) {
                let mut w = self.right(x_parent);
                if w == NIL {
                    break;
                }
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.rotate_left(x_parent);
                    w = self.right(x_parent);
                    if w == NIL {
                        break;
                    }
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        let wl = self.left(w);
                        self.set_color(wl, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(x_parent);
                    }
                    let pc = self.color(x_parent);
                    self.set_color(w, pc);
                    self.set_color(x_parent, Color::Black);
                    let wr = self.right(w);
                    self.set_color(wr, Color::Black);
                    self.rotate_left(x_parent);
                    x = self.root;
                    break;
                }
            } else {
                let mut w = self.left(x_parent);
                if w == NIL {
                    break;
                }
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.rotate_right(x_parent);
                    w = self.left(x_parent);
                    if w == NIL {
                        break;
                    }
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        let wr = self.right(w);
                        self.set_color(wr, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(x_parent);
                    }
                    let pc = self.color(x_parent);
                    self.set_color(w, pc);
                    self.set_color(x_parent, Color::Black);
                    let wl = self.left(w);
                    self.set_color(wl, Color::Black);
                    self.rotate_right(x_parent);
                    x = self.root;
                    break;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    /// 只读有序遍历（查询路径用，不支持删除）。
    /// begin/end 为 None 表示该端无界。命中条件：严格在界内，或在端点上
    /// 且该端 inclusive。`cmp(begin, end) >= 0` 视为空区间。
    pub fn range_for_each<F: FnMut(&[u8], &V)>(
        &self,
        begin: Option<&[u8]>,
        end: Option<&[u8]>,
        begin_inclusive: bool,
        end_inclusive: bool,
        f: &mut F,
    ) {
        if let (Some(b), Some(e)) = (begin, end) {
            if self.kind.compare(b, e) != Ordering::Less {
                return;
            }
        }
        self.range_visit(self.root, begin, end, begin_inclusive, end_inclusive, f);
    }

    fn range_visit<F: FnMut(&[u8], &V)>(
        &self,
        i: usize,
        begin: Option<&[u8]>,
        end: Option<&[u8]>,
        begin_inclusive: bool,
        end_inclusive: bool,
        f: &mut F,
    ) {
        if i == NIL {
            return;
        }
        let n = self.node(i);
        let cmp_begin = begin
            .map(|b| self.kind.compare(&n.key, b))
            .unwrap_or(Ordering::Greater);
        let cmp_end = end
            .map(|e| self.kind.compare(&n.key, e))
            .unwrap_or(Ordering::Less);

        if cmp_begin == Ordering::Greater {
            self.range_visit(n.left, begin, end, begin_inclusive, end_inclusive, f);
        }
        let hit = (cmp_begin == Ordering::Greater && cmp_end == Ordering::Less)
            || (begin_inclusive && cmp_begin == Ordering::Equal)
            || (end_inclusive && cmp_end == Ordering::Equal);
        if hit {
            f(&n.key, &n.value);
        }
        if cmp_end == Ordering::Less {
            self.range_visit(n.right, begin, end, begin_inclusive, end_inclusive, f);
        }
    }

    pub fn for_each<F: FnMut(&[u8], &V)>(&self, f: &mut F) {
        self.range_for_each(None, None, true, true, f);
    }

    /// 带裁决的遍历。先按界收集键快照，再逐键回查执行回调：
    /// 树在删除裁决后可以随意旋转重染，访问序列不受影响（不漏不重）。
    /// `sorted = false` 放弃有序保证（按先根序访问），其余语义相同。
    pub fn range_walk<F: FnMut(&[u8], &V) -> WalkAction>(
        &mut self,
        begin: Option<&[u8]>,
        end: Option<&[u8]>,
        begin_inclusive: bool,
        end_inclusive: bool,
        sorted: bool,
        mut cb: F,
    ) -> usize {
        if let (Some(b), Some(e)) = (begin, end) {
            if self.kind.compare(b, e) != Ordering::Less {
                return 0;
            }
        }
        let mut keys = Vec::new();
        self.collect_keys(
            self.root,
            begin,
            end,
            begin_inclusive,
            end_inclusive,
            sorted,
            &mut keys,
        );

        let mut visited = 0;
        for k in keys {
            let action = {
                let i = self.find_node(&k);
                if i == NIL {
                    continue;
                }
                let n = self.node(i);
                cb(&n.key, &n.value)
            };
            visited += 1;
            match action {
                WalkAction::Continue => {}
                WalkAction::Stop => break,
                WalkAction::DeleteAndContinue => {
                    self.remove(&k);
                }
                WalkAction::DeleteAndStop => {
                    self.remove(&k);
                    break;
                }
            }
        }
        visited
    }

    pub fn walk<F: FnMut(&[u8], &V) -> WalkAction>(&mut self, sorted: bool, cb: F) -> usize {
        self.range_walk(None, None, true, true, sorted, cb)
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_keys(
        &self,
        i: usize,
        begin: Option<&[u8]>,
        end: Option<&[u8]>,
        begin_inclusive: bool,
        end_inclusive: bool,
        sorted: bool,
        out: &mut Vec<[u8; 8]>,
    ) {
        if i == NIL {
            return;
        }
        let n = self.node(i);
        let cmp_begin = begin
            .map(|b| self.kind.compare(&n.key, b))
            .unwrap_or(Ordering::Greater);
        let cmp_end = end
            .map(|e| self.kind.compare(&n.key, e))
            .unwrap_or(Ordering::Less);
        let hit = (cmp_begin == Ordering::Greater && cmp_end == Ordering::Less)
            || (begin_inclusive && cmp_begin == Ordering::Equal)
            || (end_inclusive && cmp_end == Ordering::Equal);

        if !sorted && hit {
            out.push(n.key);
        }
        if cmp_begin == Ordering::Greater {
            self.collect_keys(n.left, begin, end, begin_inclusive, end_inclusive, sorted, out);
        }
        if sorted && hit {
            out.push(n.key);
        }
        if cmp_end == Ordering::Less {
            self.collect_keys(n.right, begin, end, begin_inclusive, end_inclusive, sorted, out);
        }
    }

    /// 校验三条红黑不变量 + BST 序。返回黑高。
    pub fn check_invariants(&self) -> Result<u32, String> {
        if self.root != NIL && self.color(self.root) == Color::Red {
            return Err("root is red".to_string());
        }
        self.check_subtree(self.root)
    }

    fn check_subtree(&self, i: usize) -> Result<u32, String> {
        if i == NIL {
            return Ok(1);
        }
        let n = self.node(i);
        if n.color == Color::Red
            && (self.color(n.left) == Color::Red || self.color(n.right) == Color::Red)
        {
            return Err(format!("red-red edge at key {:?}", n.key));
        }
        if n.left != NIL && self.kind.compare(&self.node(n.left).key, &n.key) != Ordering::Less {
            return Err("left child out of order".to_string());
        }
        if n.right != NIL && self.kind.compare(&self.node(n.right).key, &n.key) != Ordering::Greater
        {
            return Err("right child out of order".to_string());
        }
        let lh = self.check_subtree(n.left)?;
        let rh = self.check_subtree(n.right)?;
        if lh != rh {
            return Err(format!("black height mismatch: {} vs {}", lh, rh));
        }
        Ok(lh + if n.color == Color::Black { 1 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(v: i64) -> [u8; 8] {
        v.to_le_bytes()
    }

    fn tree_with(values: &[i64]) -> RbTree<i64> {
        let mut t = RbTree::new(NumKind::Int64);
        for &v in values {
            assert!(t.add(&k(v), v));
        }
        t
    }

    fn collect_range(
        t: &RbTree<i64>,
        lo: Option<i64>,
        hi: Option<i64>,
        li: bool,
        hi_incl: bool,
    ) -> Vec<i64> {
        let lo_b = lo.map(k);
        let hi_b = hi.map(k);
        let mut out = Vec::new();
        t.range_for_each(
            lo_b.as_ref().map(|b| &b[..]),
            hi_b.as_ref().map(|b| &b[..]),
            li,
            hi_incl,
            &mut |_, v| out.push(*v),
        );
        out
    }

    #[test]
    fn add_find_overwrite_remove() {
        let mut t = RbTree::new(NumKind::Int64);
        assert!(t.add(&k(7), 70));
        assert!(!t.add(&k(7), 71), "same key overwrites");
        assert_eq!(t.find(&k(7)), Some(&71));
        assert_eq!(t.len(), 1);
        assert_eq!(t.remove(&k(7)), Some(71));
        assert_eq!(t.find(&k(7)), None);
        assert!(t.is_empty());
    }

    #[test]
    fn inclusive_range_matches_both_ends() {
        let t = tree_with(&[0, 2, 3, 5, 6, 7, 9]);
        assert_eq!(collect_range(&t, Some(5), Some(9), true, true), [5, 6, 7, 9]);
    }

    #[test]
    fn exclusive_range_drops_both_ends() {
        let t = tree_with(&[0, 2, 3, 5, 6, 7, 9]);
        assert_eq!(collect_range(&t, Some(5), Some(9), false, false), [6, 7]);
    }

    #[test]
    fn open_lower_bound_is_strictly_less() {
        let t = tree_with(&[0, 2, 3, 5, 6, 7, 9]);
        assert_eq!(collect_range(&t, None, Some(5), true, false), [0, 2, 3]);
    }

    #[test]
    fn half_open_ranges() {
        let t = tree_with(&[0, 2, 3, 5, 6, 7, 9]);
        assert_eq!(collect_range(&t, Some(5), Some(9), true, false), [5, 6, 7]);
        assert_eq!(collect_range(&t, Some(5), Some(9), false, true), [6, 7, 9]);
        assert_eq!(collect_range(&t, Some(5), None, false, true), [6, 7, 9]);
    }

    #[test]
    fn degenerate_range_is_empty() {
        let mut t = tree_with(&[0, 2, 3, 5, 6, 7, 9]);
        assert_eq!(collect_range(&t, Some(5), Some(5), true, true), [] as [i64; 0]);
        assert_eq!(collect_range(&t, Some(9), Some(5), true, true), [] as [i64; 0]);
        assert_eq!(
            t.range_walk(Some(&k(5)), Some(&k(5)), true, true, true, |_, _| {
                WalkAction::Continue
            }),
            0
        );
    }

    #[test]
    fn walk_stop_halts_early() {
        let mut t = tree_with(&[1, 2, 3, 4, 5]);
        let mut seen = Vec::new();
        t.walk(true, |key, _| {
            seen.push(i64::from_le_bytes(key.try_into().unwrap()));
            if seen.len() == 3 {
                WalkAction::Stop
            } else {
                WalkAction::Continue
            }
        });
        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn walk_delete_and_continue_visits_everything_once() {
        let mut t = tree_with(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut seen = Vec::new();
        t.walk(true, |key, _| {
            let v = i64::from_le_bytes(key.try_into().unwrap());
            seen.push(v);
            if v % 2 == 1 {
                WalkAction::DeleteAndContinue
            } else {
                WalkAction::Continue
            }
        });
        assert_eq!(seen, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(t.len(), 4);
        t.check_invariants().unwrap();
        assert_eq!(collect_range(&t, None, None, true, true), [2, 4, 6, 8]);
    }

    #[test]
    fn invariants_hold_under_random_churn() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x1DE0);
        let mut t: RbTree<i64> = RbTree::new(NumKind::Int64);
        let mut reference = std::collections::BTreeMap::new();

        for step in 0..2000 {
            let v = rng.gen_range(-500i64..500);
            if rng.gen_bool(0.6) {
                t.add(&k(v), v);
                reference.insert(v, v);
            } else {
                let removed = t.remove(&k(v));
                assert_eq!(removed.is_some(), reference.remove(&v).is_some());
            }
            if step % 100 == 0 {
                t.check_invariants().unwrap();
            }
        }
        t.check_invariants().unwrap();
        assert_eq!(t.len(), reference.len());

        let all = collect_range(&t, None, None, true, true);
        let expect: Vec<i64> = reference.keys().copied().collect();
        assert_eq!(all, expect);
    }

    #[test]
    fn double_keys_order_by_value_not_bits() {
        let mut t = RbTree::new(NumKind::Double);
        for v in [2.5f64, -1.0, 0.25, 10.0] {
            t.add(&v.to_le_bytes(), ());
        }
        let mut seen = Vec::new();
        t.for_each(&mut |key, _| {
            seen.push(f64::from_le_bytes(key.try_into().unwrap()));
        });
        assert_eq!(seen, [-1.0, 0.25, 2.5, 10.0]);
    }

    #[test]
    fn unsorted_walk_visits_same_set() {
        let mut t = tree_with(&[3, 1, 4, 5, 9, 2, 6]);
        let mut seen = Vec::new();
        t.walk(false, |key, _| {
            seen.push(i64::from_le_bytes(key.try_into().unwrap()));
            WalkAction::Continue
        });
        seen.sort_unstable();
        assert_eq!(seen, [1, 2, 3, 4, 5, 6, 9]);
    }
}
