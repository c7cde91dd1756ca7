//! 命中区域的十六进制展示（纯函数，无状态无副作用）

/// 将 `data` 渲染为固定 16 字节宽的行
///
/// 行格式：8 位大写十六进制绝对偏移列、两位十六进制字节值
/// （第 8 个字节后留一个视觉空隙）、可打印 ASCII 列（0x20..=0x7E
/// 原样输出，其余显示为 `.`）。`end_offset` 是这段数据在原始文件中
/// 的结束偏移；为 0 时偏移列固定显示 0。
pub fn hex_region_lines(data: &[u8], end_offset: usize) -> Vec<String> {
    let file_offset = end_offset.saturating_sub(data.len());
    let mut lines = Vec::new();
    let mut offset = 0usize;

    while offset < data.len() {
        let print_offset = if end_offset != 0 { file_offset + offset } else { 0 };
        let mut line = format!("{print_offset:08X}   ");

        // 十六进制列：不足一行的位置用两个空格占位，保持列对齐
        let mut cells: Vec<String> = Vec::with_capacity(17);
        for i in 0..16 {
            if offset + i < data.len() {
                cells.push(format!("{:02X}", data[offset + i]));
            } else {
                cells.push("  ".to_string());
            }
            if i == 7 {
                cells.push(String::new());
            }
        }
        line.push_str(&cells.join(" "));
        line.push_str("  ");

        // ASCII 列
        for i in 0..16 {
            if offset + i < data.len() {
                let b = data[offset + i];
                line.push(if (0x20..=0x7E).contains(&b) { b as char } else { '.' });
            } else {
                line.push(' ');
            }
        }

        lines.push(line);
        offset += 16;
    }

    lines
}
